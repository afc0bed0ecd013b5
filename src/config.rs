// SPDX-FileCopyrightText: 2026 Figrelay Contributors
// SPDX-License-Identifier: MIT

//! Process configuration: a listen port and a pass-through Figma access token, both read once
//! at startup. There is no hot-reload.

pub const DEFAULT_PORT: u16 = 3055;

pub const PORT_ENV: &str = "FIGRELAY_PORT";
pub const TOKEN_ENV: &str = "FIGMA_ACCESS_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub figma_token: Option<String>,
}

impl Config {
    /// Resolves the effective configuration from explicit CLI values with environment
    /// fallbacks. An unparseable port in the environment is reported, not silently defaulted.
    pub fn resolve(
        cli_port: Option<u16>,
        cli_token: Option<String>,
    ) -> Result<Self, String> {
        let port = match cli_port {
            Some(port) => port,
            None => match std::env::var(PORT_ENV) {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| format!("{PORT_ENV} must be a port number, got {raw:?}"))?,
                Err(_) => DEFAULT_PORT,
            },
        };
        let figma_token = cli_token.or_else(|| std::env::var(TOKEN_ENV).ok());
        Ok(Self { port, figma_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_win_over_defaults() {
        let config =
            Config::resolve(Some(4000), Some("token".to_owned())).expect("config");
        assert_eq!(config.port, 4000);
        assert_eq!(config.figma_token.as_deref(), Some("token"));
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        // run without the env vars set; CI never sets them
        if std::env::var(PORT_ENV).is_err() {
            let config = Config::resolve(None, None).expect("config");
            assert_eq!(config.port, DEFAULT_PORT);
        }
    }
}
