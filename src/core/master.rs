use crate::utils::error::{Result, SmokeError};
use std::fmt;
use std::str::FromStr;
use url::{Host, Url};

pub const STANDALONE_SCHEME: &str = "spark";
pub const DEFAULT_MASTER_PORT: u16 = 7077;

/// Builds the standalone master URL from its host and API port.
pub fn build_master_url(host: &str, port: u16) -> String {
    format!("{}://{}:{}", STANDALONE_SCHEME, url_host(host), port)
}

/// Host as it must appear in a URL authority: IPv6 literals get brackets.
pub fn url_host(host: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalThreads {
    /// One thread per available core (`local[*]`).
    All,
    Fixed(usize),
}

impl LocalThreads {
    pub fn resolve(self) -> usize {
        match self {
            LocalThreads::Fixed(n) => n,
            LocalThreads::All => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterUrl {
    Local { threads: LocalThreads },
    Standalone { host: String, port: u16 },
}

impl MasterUrl {
    pub fn standalone(host: impl Into<String>, port: u16) -> Self {
        MasterUrl::Standalone {
            host: host.into(),
            port,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, MasterUrl::Local { .. })
    }

    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let invalid = |reason: &str| SmokeError::InvalidMasterUrl {
            url: input.to_string(),
            reason: reason.to_string(),
        };

        if input == "local" {
            return Ok(MasterUrl::Local {
                threads: LocalThreads::Fixed(1),
            });
        }

        if let Some(inner) = input
            .strip_prefix("local[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            if inner == "*" {
                return Ok(MasterUrl::Local {
                    threads: LocalThreads::All,
                });
            }
            return match inner.parse::<usize>() {
                Ok(n) if n > 0 => Ok(MasterUrl::Local {
                    threads: LocalThreads::Fixed(n),
                }),
                _ => Err(invalid("thread count must be a positive integer or '*'")),
            };
        }

        let url = Url::parse(input).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != STANDALONE_SCHEME {
            return Err(invalid(&format!("unsupported scheme '{}'", url.scheme())));
        }
        if !(url.path().is_empty() || url.path() == "/")
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return Err(invalid("master URL must not carry a path, query or fragment"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("master URL must not carry credentials"));
        }

        let host = match url.host() {
            Some(Host::Domain(d)) if !d.is_empty() => d.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            _ => return Err(invalid("missing host")),
        };

        Ok(MasterUrl::Standalone {
            host,
            port: url.port().unwrap_or(DEFAULT_MASTER_PORT),
        })
    }
}

impl FromStr for MasterUrl {
    type Err = SmokeError;

    fn from_str(s: &str) -> Result<Self> {
        MasterUrl::parse(s)
    }
}

impl fmt::Display for MasterUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MasterUrl::Local {
                threads: LocalThreads::All,
            } => write!(f, "local[*]"),
            MasterUrl::Local {
                threads: LocalThreads::Fixed(n),
            } => write!(f, "local[{}]", n),
            MasterUrl::Standalone { host, port } => f.write_str(&build_master_url(host, *port)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_master_url() {
        assert_eq!(build_master_url("10.0.0.5", 7077), "spark://10.0.0.5:7077");
        assert_eq!(build_master_url("::1", 7077), "spark://[::1]:7077");
        assert_eq!(build_master_url("[::1]", 7077), "spark://[::1]:7077");
    }

    #[test]
    fn test_ipv6_host_and_port_parse_back() {
        let master = MasterUrl::parse(&build_master_url("fd00::5", 7078)).unwrap();
        assert_eq!(master, MasterUrl::standalone("fd00::5", 7078));
    }

    #[test]
    fn test_parse_standalone() {
        let master = MasterUrl::parse("spark://10.0.0.5:7077").unwrap();
        assert_eq!(master, MasterUrl::standalone("10.0.0.5", 7077));
        assert_eq!(master.to_string(), "spark://10.0.0.5:7077");

        let master = MasterUrl::parse("spark://spark-master.internal").unwrap();
        assert_eq!(master, MasterUrl::standalone("spark-master.internal", DEFAULT_MASTER_PORT));
    }

    #[test]
    fn test_parse_ipv6_standalone() {
        let master = MasterUrl::parse("spark://[::1]:7077").unwrap();
        assert_eq!(master, MasterUrl::standalone("::1", 7077));
        assert_eq!(master.to_string(), "spark://[::1]:7077");
    }

    #[test]
    fn test_parse_local_variants() {
        assert_eq!(
            MasterUrl::parse("local").unwrap(),
            MasterUrl::Local {
                threads: LocalThreads::Fixed(1)
            }
        );
        assert_eq!(
            MasterUrl::parse("local[4]").unwrap(),
            MasterUrl::Local {
                threads: LocalThreads::Fixed(4)
            }
        );
        assert_eq!(MasterUrl::parse("local[*]").unwrap().to_string(), "local[*]");
        assert!(LocalThreads::All.resolve() >= 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in [
            "",
            "local[0]",
            "local[x]",
            "http://10.0.0.5:7077",
            "spark://10.0.0.5:7077/path",
            "spark://user:pw@10.0.0.5:7077",
            "10.0.0.5:7077",
        ] {
            assert!(
                matches!(MasterUrl::parse(input), Err(SmokeError::InvalidMasterUrl { .. })),
                "expected '{}' to be rejected",
                input
            );
        }
    }
}
