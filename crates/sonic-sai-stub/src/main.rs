//! LAG stub demo driver.
//!
//! Initializes the stub, builds two LAGs with two members each, queries
//! them, tears everything down again and exits non-zero on the first
//! failed call.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info};
use sonic_sai::{LagMemberOid, LagOid, PortOid, SaiAttribute, SaiError, SAI_NULL_OBJECT_ID};
use sonic_sai_stub::lag::{
    SAI_LAG_ATTR_PORT_LIST, SAI_LAG_MEMBER_ATTR_LAG_ID, SAI_LAG_MEMBER_ATTR_PORT_ID,
};
use sonic_sai_stub::{LagApi, LagDbStrategy, SaiStub, StubConfig};

/// Exercise the in-process SAI LAG stub
#[derive(Parser, Debug)]
#[command(name = "lag-stub-demo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short = 'c', long, default_value = "/etc/sonic/sai-lag-stub.conf")]
    config: PathBuf,

    /// LAG database strategy (fixed, dynamic)
    #[arg(short = 's', long)]
    strategy: Option<LagDbStrategy>,

    /// Number of LAG slots for the fixed strategy
    #[arg(long)]
    max_lags: Option<usize>,

    /// Number of LAG member slots for the fixed strategy
    #[arg(long)]
    max_lag_members: Option<usize>,

    /// Switch profile entries (KEY=VALUE), applied after the config file
    #[arg(short = 'p', long = "profile", value_parser = parse_profile_entry)]
    profile: Vec<(String, String)>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

fn parse_profile_entry(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))
}

fn load_config(args: &Args) -> Result<StubConfig> {
    let mut config = StubConfig::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(strategy) = args.strategy {
        config.lag.strategy = strategy;
    }
    if let Some(max_lags) = args.max_lags {
        config.lag.max_lags = max_lags;
    }
    if let Some(max_lag_members) = args.max_lag_members {
        config.lag.max_lag_members = max_lag_members;
    }
    Ok(config)
}

fn member_attrs(lag: LagOid, port: PortOid) -> [SaiAttribute; 2] {
    [
        SaiAttribute::oid(SAI_LAG_MEMBER_ATTR_LAG_ID, lag.as_raw()),
        SaiAttribute::oid(SAI_LAG_MEMBER_ATTR_PORT_ID, port.as_raw()),
    ]
}

fn show_lag_ports(api: &dyn LagApi, lag: LagOid) -> Result<()> {
    let mut attrs = [SaiAttribute::obj_list(SAI_LAG_ATTR_PORT_LIST, 2)];
    api.get_lag_attribute(lag, &mut attrs)
        .with_context(|| format!("get LAG {} ports", lag))?;
    Ok(())
}

fn show_member(api: &dyn LagApi, member: LagMemberOid) -> Result<()> {
    let mut attrs = [
        SaiAttribute::oid(SAI_LAG_MEMBER_ATTR_LAG_ID, SAI_NULL_OBJECT_ID),
        SaiAttribute::oid(SAI_LAG_MEMBER_ATTR_PORT_ID, SAI_NULL_OBJECT_ID),
    ];
    api.get_lag_member_attribute(member, &mut attrs)
        .with_context(|| format!("get LAG member {}", member))?;
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let profile: HashMap<String, String> = args.profile.iter().cloned().collect();
    let mut stub = SaiStub::initialize(0, &profile, config).context("sai_api_initialize")?;
    let api = stub.lag_api().context("query LAG API")?;

    let lag1 = api.create_lag(&[]).context("create LAG #1")?;
    let mut members = Vec::with_capacity(4);
    for port in [1, 2] {
        let member = api
            .create_lag_member(&member_attrs(lag1, PortOid::encode(port, 0)))
            .with_context(|| format!("create LAG member on port {}", port))?;
        members.push(member);
    }

    let lag2 = api.create_lag(&[]).context("create LAG #2")?;
    for port in [3, 4] {
        let member = api
            .create_lag_member(&member_attrs(lag2, PortOid::encode(port, 0)))
            .with_context(|| format!("create LAG member on port {}", port))?;
        members.push(member);
    }

    show_lag_ports(api, lag1)?;
    show_lag_ports(api, lag2)?;
    for member in &members {
        show_member(api, *member)?;
    }

    let [m1, m2, m3, m4] = members[..] else {
        return Err(anyhow!("expected 4 LAG members, have {}", members.len()));
    };

    api.remove_lag_member(m2).context("remove LAG member #2")?;
    api.remove_lag_member(m3).context("remove LAG member #3")?;
    show_lag_ports(api, lag1)?;
    show_lag_ports(api, lag2)?;

    api.remove_lag_member(m1).context("remove LAG member #1")?;
    api.remove_lag_member(m4).context("remove LAG member #4")?;
    api.remove_lag(lag1).context("remove LAG #1")?;
    api.remove_lag(lag2).context("remove LAG #2")?;

    stub.uninitialize().context("sai_api_uninitialize")?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let env = env_logger::Env::default().default_filter_or(&args.log_level);
    env_logger::Builder::from_env(env).init();

    match run(&args) {
        Ok(()) => {
            info!("LAG stub demo completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("LAG stub demo failed: {:#}", e);
            if let Some(sai) = e.downcast_ref::<SaiError>() {
                let status = sai.status();
                error!("Status: {} ({})", status, status.as_raw());
            }
            ExitCode::FAILURE
        }
    }
}
