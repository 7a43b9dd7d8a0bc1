//! `ping`: echo round trips against a server.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use client::RpcClient;

use crate::PingArgs;

pub fn ping(args: &PingArgs) -> Result<()> {
    let server = &args.server;
    let client = RpcClient::connect_to(&server.host, server.port, server.client_config())
        .with_context(|| format!("connect to {}:{}", server.host, server.port))?;

    let mut rtts = Vec::with_capacity(args.count as usize);
    for i in 0..args.count {
        let started = Instant::now();
        client
            .echo(args.payload.as_bytes())
            .with_context(|| format!("echo {i}"))?;
        let rtt = started.elapsed();
        println!("echo {i}: {:.3} ms", millis(rtt));
        rtts.push(rtt);
    }
    client.close();

    if let Some(summary) = summarize(&rtts) {
        println!(
            "{} echoes: min {:.3} ms, avg {:.3} ms, max {:.3} ms",
            rtts.len(),
            millis(summary.min),
            millis(summary.avg),
            millis(summary.max)
        );
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct Summary {
    min: Duration,
    avg: Duration,
    max: Duration,
}

fn summarize(rtts: &[Duration]) -> Option<Summary> {
    let min = *rtts.iter().min()?;
    let max = *rtts.iter().max()?;
    let total: Duration = rtts.iter().sum();
    let avg = total / u32::try_from(rtts.len()).ok()?;
    Some(Summary { min, avg, max })
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
