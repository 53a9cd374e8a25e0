//! Control plane walkthrough against an in-memory session tree
//!
//! Run with: cargo run --example control_demo
//!
//! Builds one server with `live` and `vod` applications, attaches a few
//! sessions, then issues control requests the way an operator would:
//!
//!   GET /control/record/start?app=live&name=cam1
//!   GET /control/redirect/subscriber?app=live&name=cam1&newname=cam2
//!   GET /control/relay/start?app=vod&name=mirror&pull=rtmp%3A%2F%2Forigin%2Flive%2Fcam1
//!   GET /control/relay/stop?app=vod&name=mirror
//!   GET /control/drop/client?app=live
//!
//! Set RUST_LOG=rtmp_control=trace for the walker's debug output.

use std::sync::Arc;
use std::time::Duration;

use rtmp_control::control::{RecordControl, RecorderSlot, SessionMatch};
use rtmp_control::relay::{RelayConnector, StandardRelayArgs, StaticPull, TokioReconnectScheduler};
use rtmp_control::{
    AppIdentity, ControlConfig, ControlRequest, ControlSections, ControlService, HostError,
    ServerTree, Session, SessionId, SessionRole,
};

/// Pretends to write FLV files under /var/rec
struct FileRecorder;

impl RecordControl for FileRecorder {
    fn find(&self, _app: AppIdentity, name: &str) -> Option<RecorderSlot> {
        name.is_empty().then_some(RecorderSlot(0))
    }

    fn open(
        &mut self,
        session: &SessionMatch,
        _slot: RecorderSlot,
    ) -> Result<Option<String>, HostError> {
        Ok(Some(format!("/var/rec/{}-{}.flv", session.stream, session.session)))
    }

    fn close(
        &mut self,
        _session: &SessionMatch,
        _slot: RecorderSlot,
    ) -> Result<Option<String>, HostError> {
        Ok(None)
    }
}

/// Logs each reconnect attempt instead of dialing out
struct LoggingConnector;

impl RelayConnector for LoggingConnector {
    fn reconnect(&self, pull: &StaticPull) {
        println!(
            "  reconnect {} -> {} (app {}, play path {})",
            pull.target.url, pull.identity, pull.target.app, pull.target.play_path
        );
    }
}

fn build_tree(config: &ControlConfig) -> Result<ServerTree, HostError> {
    let mut tree = ServerTree::from_config(config);
    let srv = tree.add_server();
    let server = tree
        .server_mut(srv)
        .ok_or_else(|| HostError::Other("server missing".into()))?;

    server.add_application("live");
    server.add_application("vod");

    let sessions = [
        (1, "192.168.1.10", SessionRole::Publisher, "live", "cam1"),
        (2, "192.168.1.20", SessionRole::Subscriber, "live", "cam1"),
        (3, "192.168.1.21", SessionRole::Subscriber, "live", "cam1"),
        (4, "192.168.1.11", SessionRole::Publisher, "live", "cam2"),
    ];

    for (id, addr, role, app, stream) in sessions {
        server.connect(Session::new(id, addr, role));
        server.attach(SessionId(id), app, stream, role)?;
    }

    Ok(tree)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rtmp_control=info".parse()?)
                .add_directive("control_demo=debug".parse()?),
        )
        .init();

    let config = ControlConfig::with_sections(ControlSections::ALL)
        .stream_buckets(64)
        .reconnect_interval(Duration::from_millis(500));

    let mut tree = build_tree(&config)?;

    let scheduler = TokioReconnectScheduler::from_config(
        tokio::runtime::Handle::current(),
        Arc::new(LoggingConnector),
        &config,
    );

    let mut service = ControlService::new(
        config,
        Box::new(FileRecorder),
        Box::new(StandardRelayArgs),
        Box::new(scheduler),
    );

    let mut run = |tree: &mut ServerTree, target: &str| {
        let request = ControlRequest::parse(target);
        match service.handle(tree, &request) {
            Some(response) => println!(
                "GET {} -> {} {:?}",
                target,
                response.status,
                String::from_utf8_lossy(&response.body)
            ),
            None => println!("GET {} -> declined", target),
        }
    };

    run(&mut tree, "/control/record/start?app=live&name=cam1");
    run(&mut tree, "/control/redirect/subscriber?app=live&name=cam1&newname=cam2");
    run(&mut tree, "/control/stats/all");

    run(
        &mut tree,
        "/control/relay/start?app=vod&name=mirror&pull=rtmp%3A%2F%2Forigin%2Flive%2Fcam1",
    );
    tokio::time::sleep(Duration::from_millis(1200)).await;
    run(&mut tree, "/control/relay/stop?app=vod&name=mirror");

    run(&mut tree, "/control/drop/client?app=live");

    let remaining = tree.server(0).map(|s| s.session_count()).unwrap_or(0);
    println!("Sessions left: {}", remaining);

    Ok(())
}
