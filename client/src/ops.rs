//! Typed protocol operations.
//!
//! Each operation builds its payload, performs exactly one round trip and
//! decodes a typed result. Only the FAIL messages named by [`USER_EXISTS`] and
//! [`NO_MESSAGES`] are tolerated, and only by the operation that expects them.

use buffer::DynamicBuffer;
use tracing::trace;
use wire::field::{self, write_bytes, write_string};
use wire::{decode_u64, AuthToken, ChatMessage, RequestKind, TransferReceipt};

use crate::client::{server_failure, RpcClient, Transport};
use crate::error::{ClientError, ClientResult};

/// FAIL message for registering a name that is already taken.
pub const USER_EXISTS: &str = "User exists";

/// FAIL message for reading an empty chat queue.
pub const NO_MESSAGES: &str = "No messages";

/// Starts a payload with the token every authenticated request leads with.
fn authed(token: &AuthToken) -> ClientResult<DynamicBuffer> {
    let mut buf = DynamicBuffer::with_capacity(AuthToken::WIRE_SIZE + 16);
    token.write_to(&mut buf)?;
    Ok(buf)
}

impl<T: Transport> RpcClient<T> {
    /// Sends `data` and checks the server returns it byte for byte.
    pub fn echo(&self, data: &[u8]) -> ClientResult<()> {
        let reply = self.call(RequestKind::Echo, data)?;
        if reply.payload != data {
            return Err(ClientError::EchoMismatch {
                sent: data.len(),
                received: reply.len(),
            });
        }
        Ok(())
    }

    /// Registers an account.
    ///
    /// With `exist_ok`, a server reporting that the user already exists counts
    /// as success.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        pubkey: &str,
        exist_ok: bool,
    ) -> ClientResult<()> {
        let mut buf = DynamicBuffer::new();
        write_string(&mut buf, username)?;
        write_string(&mut buf, password)?;
        write_string(&mut buf, pubkey)?;

        let reply = self.round_trip(RequestKind::Register, buf.as_slice())?;
        if reply.is_fail() {
            if exist_ok && reply.is_fail_with(USER_EXISTS) {
                trace!(username, "user already registered");
                return Ok(());
            }
            return Err(server_failure(RequestKind::Register, &reply));
        }
        Ok(())
    }

    /// Logs in and returns the session token.
    pub fn authenticate(&self, username: &str, password: &str) -> ClientResult<AuthToken> {
        let mut buf = DynamicBuffer::new();
        write_string(&mut buf, username)?;
        write_string(&mut buf, password)?;

        let reply = self.call(RequestKind::Auth, buf.as_slice())?;
        Ok(AuthToken::decode(&reply.payload)?)
    }

    /// Looks up the id of `username`.
    pub fn user_id(&self, token: &AuthToken, username: &str) -> ClientResult<u64> {
        let mut buf = authed(token)?;
        write_string(&mut buf, username)?;

        let reply = self.call(RequestKind::UserId, buf.as_slice())?;
        Ok(decode_u64("user id", &reply.payload)?)
    }

    /// Looks up the name of `user_id`.
    pub fn username(&self, token: &AuthToken, user_id: u64) -> ClientResult<String> {
        self.string_query(RequestKind::Username, token, user_id)
    }

    /// Looks up the public key (PEM text) of `user_id`.
    pub fn public_key(&self, token: &AuthToken, user_id: u64) -> ClientResult<String> {
        self.string_query(RequestKind::PublicKey, token, user_id)
    }

    /// Sends a chat message to `recipient`.
    pub fn send_chat(&self, token: &AuthToken, recipient: u64, content: &str) -> ClientResult<()> {
        let mut buf = authed(token)?;
        buf.write_u64(recipient)?;
        write_string(&mut buf, content)?;

        self.call(RequestKind::ChatSend, buf.as_slice())?;
        Ok(())
    }

    /// Pops the next pending chat message, or `None` if the queue is empty.
    pub fn read_chat(&self, token: &AuthToken) -> ClientResult<Option<ChatMessage>> {
        let buf = authed(token)?;

        let reply = self.round_trip(RequestKind::ChatRead, buf.as_slice())?;
        if reply.is_fail() {
            if reply.is_fail_with(NO_MESSAGES) {
                return Ok(None);
            }
            return Err(server_failure(RequestKind::ChatRead, &reply));
        }

        let mut payload = reply.into_buffer();
        Ok(Some(ChatMessage::decode(&mut payload)?))
    }

    /// Returns the balance held in `currency`.
    pub fn balance(&self, token: &AuthToken, currency: u64) -> ClientResult<u64> {
        let mut buf = authed(token)?;
        buf.write_u64(currency)?;

        let reply = self.call(RequestKind::Balance, buf.as_slice())?;
        Ok(decode_u64("balance", &reply.payload)?)
    }

    /// Transfers `amount` of `currency` to `recipient`, returning the receipt
    /// the recipient needs to claim it.
    pub fn transfer(
        &self,
        token: &AuthToken,
        amount: u64,
        currency: u64,
        recipient: u64,
    ) -> ClientResult<TransferReceipt> {
        let mut buf = authed(token)?;
        buf.write_u64(amount)?;
        buf.write_u64(currency)?;
        buf.write_u64(recipient)?;

        let reply = self.call(RequestKind::Transfer, buf.as_slice())?;
        Ok(TransferReceipt::decode(&reply.payload)?)
    }

    /// Claims the funds of a receipt addressed to this user.
    pub fn receive(&self, token: &AuthToken, receipt: &TransferReceipt) -> ClientResult<()> {
        let mut buf = authed(token)?;
        receipt.write_to(&mut buf)?;

        self.call(RequestKind::Receive, buf.as_slice())?;
        Ok(())
    }

    /// Asks the server whether `receipt` is valid. The answer is the reply
    /// status alone.
    pub fn check_receipt(&self, token: &AuthToken, receipt: &TransferReceipt) -> ClientResult<bool> {
        let mut buf = authed(token)?;
        receipt.write_to(&mut buf)?;

        let reply = self.round_trip(RequestKind::CheckReceipt, buf.as_slice())?;
        Ok(reply.is_ok())
    }

    /// Mints `amount` of a new currency, returning its id.
    pub fn mint(&self, token: &AuthToken, amount: u64) -> ClientResult<u64> {
        let mut buf = authed(token)?;
        buf.write_u64(amount)?;

        let reply = self.call(RequestKind::Mint, buf.as_slice())?;
        Ok(decode_u64("currency id", &reply.payload)?)
    }

    /// Uploads a backup archive and returns its id.
    ///
    /// An empty `data` asks the server to snapshot the current account state.
    pub fn new_backup(&self, token: &AuthToken, data: &[u8]) -> ClientResult<String> {
        let mut buf = authed(token)?;
        write_bytes(&mut buf, data)?;

        let mut payload = self
            .call(RequestKind::NewBackup, buf.as_slice())?
            .into_buffer();
        Ok(field::read_string(&mut payload)?.to_owned())
    }

    /// Downloads the backup archive stored under `id`.
    pub fn get_backup(&self, token: &AuthToken, id: &str) -> ClientResult<Vec<u8>> {
        let mut buf = authed(token)?;
        write_string(&mut buf, id)?;

        let reply = self.call(RequestKind::GetBackup, buf.as_slice())?;
        Ok(reply.payload)
    }

    fn string_query(&self, kind: RequestKind, token: &AuthToken, user_id: u64) -> ClientResult<String> {
        let mut buf = authed(token)?;
        buf.write_u64(user_id)?;

        let mut payload = self.call(kind, buf.as_slice())?.into_buffer();
        Ok(field::read_string(&mut payload)?.to_owned())
    }
}
