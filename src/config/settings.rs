use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the WebSocket endpoint, the sockets built on the
/// matching core, and logging.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub socket: SocketSettings,
    pub log: LogSettings,
}

/// Address the WebSocket publisher binds to (and subscribers connect to).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Per-socket behaviour of publishers and subscribers.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SocketSettings {
    /// Depth of each channel's outbound queue. A full queue drops the message
    /// for that channel only.
    pub send_capacity: usize,
    /// Depth of a subscriber's inbound queue.
    pub recv_capacity: usize,
    /// Initial invert-matching flag for newly created sockets.
    pub invert_matching: bool,
    /// Whether subscribers re-check incoming messages against their own trie.
    pub local_filter: bool,
    /// Removals on a channel trie before inactive nodes are swept. `0` never sweeps.
    pub prune_threshold: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Any field may be absent. Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub socket: Option<PartialSocketSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialSocketSettings {
    pub send_capacity: Option<usize>,
    pub recv_capacity: Option<usize>,
    pub invert_matching: Option<bool>,
    pub local_filter: Option<bool>,
    pub prune_threshold: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 5556,
            },
            socket: SocketSettings::default(),
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for SocketSettings {
    fn default() -> Self {
        Self {
            send_capacity: 1000,
            recv_capacity: 1000,
            invert_matching: false,
            local_filter: true,
            prune_threshold: 64,
        }
    }
}

impl PartialSettings {
    /// Fill every missing value from `Settings::default()`.
    pub fn merge_with_defaults(self) -> Settings {
        let default = Settings::default();
        let server = self.server;
        let socket = self.socket;
        let log = self.log;

        Settings {
            server: ServerSettings {
                host: server
                    .as_ref()
                    .and_then(|s| s.host.clone())
                    .unwrap_or(default.server.host),
                port: server
                    .as_ref()
                    .and_then(|s| s.port)
                    .unwrap_or(default.server.port),
            },
            socket: SocketSettings {
                send_capacity: socket
                    .as_ref()
                    .and_then(|s| s.send_capacity)
                    .unwrap_or(default.socket.send_capacity),
                recv_capacity: socket
                    .as_ref()
                    .and_then(|s| s.recv_capacity)
                    .unwrap_or(default.socket.recv_capacity),
                invert_matching: socket
                    .as_ref()
                    .and_then(|s| s.invert_matching)
                    .unwrap_or(default.socket.invert_matching),
                local_filter: socket
                    .as_ref()
                    .and_then(|s| s.local_filter)
                    .unwrap_or(default.socket.local_filter),
                prune_threshold: socket
                    .as_ref()
                    .and_then(|s| s.prune_threshold)
                    .unwrap_or(default.socket.prune_threshold),
            },
            log: LogSettings {
                level: log
                    .and_then(|l| l.level)
                    .unwrap_or(default.log.level),
            },
        }
    }
}
