use clap::Parser;

use crate::config::{get_config_dir, get_data_dir};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Tick rate, i.e. number of ticks per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 4.0)]
    pub tick_rate: f64,

    /// Frame rate, i.e. number of frames per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 60.0)]
    pub frame_rate: f64,

    /// Base URL of the CMS API, overriding the configured one
    #[arg(short, long, value_name = "URL")]
    pub base_url: Option<String>,
}

const GIT_DESCRIBE: &str = match option_env!("VERGEN_GIT_DESCRIBE") {
    Some(describe) => describe,
    None => "unknown",
};
const BUILD_DATE: &str = match option_env!("VERGEN_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

pub fn version() -> String {
    let author = clap::crate_authors!();
    let version = env!("CARGO_PKG_VERSION");

    let config_dir_path = get_config_dir().display().to_string();
    let data_dir_path = get_data_dir().display().to_string();

    format!(
        "\
{version}-{GIT_DESCRIBE} ({BUILD_DATE})

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_optional() {
        let cli = Cli::parse_from(["rank-desk"]);
        assert_eq!(cli.base_url, None);

        let cli = Cli::parse_from(["rank-desk", "--base-url", "http://cms.test/api", "-t", "2"]);
        assert_eq!(cli.base_url.as_deref(), Some("http://cms.test/api"));
        assert_eq!(cli.tick_rate, 2.0);
    }
}
