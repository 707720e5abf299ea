use bench_run_model::{DirectorySource, DEFAULT_EXTENSION};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default directory holding the run documents
pub const DEFAULT_DATA_DIR: &str = "static/all_json_files";
/// Default address for the HTTP server
pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";

#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None)]
pub struct DashboardCli {
    /// Directory containing one run document per benchmark run.
    ///
    /// The directory is read again on every request so new runs show up without a restart.
    #[clap(long, env = "RUN_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Only files with this extension are treated as run documents
    #[clap(long, env = "RUN_FILE_EXTENSION", default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Address to serve the dashboard on
    #[clap(long, env = "DASHBOARD_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,
}

/// Where the dashboard finds its data.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub extension: String,
}

impl DashboardConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn source(&self) -> DirectorySource {
        DirectorySource::new(&self.data_dir).with_extension(&self.extension)
    }
}

impl From<&DashboardCli> for DashboardConfig {
    fn from(cli: &DashboardCli) -> Self {
        Self {
            data_dir: cli.data_dir.clone(),
            extension: cli.extension.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = DashboardCli::try_parse_from(["bench-dashboard"]).unwrap();
        // The environment may override these, only check what it cannot change
        if std::env::var_os("RUN_DATA_DIR").is_none() {
            assert_eq!(cli.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        }
        if std::env::var_os("DASHBOARD_LISTEN").is_none() {
            assert_eq!(cli.listen, DEFAULT_LISTEN.parse::<SocketAddr>().unwrap());
        }
    }

    #[test]
    fn flags() {
        let cli = DashboardCli::try_parse_from([
            "bench-dashboard",
            "--data-dir",
            "/tmp/runs",
            "--extension",
            "run",
            "--listen",
            "0.0.0.0:8080",
        ])
        .unwrap();

        let config = DashboardConfig::from(&cli);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/runs"));
        assert_eq!(config.extension, "run");
        assert_eq!(config.source().path(), std::path::Path::new("/tmp/runs"));
        assert_eq!(cli.listen.port(), 8080);
    }
}
