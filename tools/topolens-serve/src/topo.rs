// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topology templates for the standalone server.
//!
//! `minimal`, `single,N`, `linear,N` and `tree,DEPTH[,FANOUT]`, each with a
//! controller `c0`.

use std::str::FromStr;
use thiserror::Error;
use topolens::{ModelError, Topology};

#[derive(Debug, Error)]
pub enum TopoError {
    #[error("unknown topology template '{0}' (expected minimal, single, linear or tree)")]
    Unknown(String),

    #[error("invalid argument for '{template}': {reason}")]
    BadArgument {
        template: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Parsed `--topo` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopoSpec {
    Minimal,
    Single(u32),
    Linear(u32),
    Tree { depth: u32, fanout: u32 },
}

impl FromStr for TopoSpec {
    type Err = TopoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match name {
            "minimal" => {
                expect_args("minimal", &args, 0)?;
                Ok(TopoSpec::Minimal)
            }
            "single" => {
                expect_args("single", &args, 1)?;
                Ok(TopoSpec::Single(arg_or("single", &args, 0, 3)?))
            }
            "linear" => {
                expect_args("linear", &args, 1)?;
                Ok(TopoSpec::Linear(arg_or("linear", &args, 0, 2)?))
            }
            "tree" => {
                expect_args("tree", &args, 2)?;
                Ok(TopoSpec::Tree {
                    depth: arg_or("tree", &args, 0, 1)?,
                    fanout: arg_or("tree", &args, 1, 2)?,
                })
            }
            other => Err(TopoError::Unknown(other.to_string())),
        }
    }
}

fn expect_args(template: &'static str, args: &[&str], max: usize) -> Result<(), TopoError> {
    if args.len() > max {
        return Err(TopoError::BadArgument {
            template,
            reason: format!("expected at most {} argument(s), got {}", max, args.len()),
        });
    }
    Ok(())
}

fn arg_or(
    template: &'static str,
    args: &[&str],
    index: usize,
    default: u32,
) -> Result<u32, TopoError> {
    let Some(raw) = args.get(index) else {
        return Ok(default);
    };
    match raw.parse::<u32>() {
        Ok(0) => Err(TopoError::BadArgument {
            template,
            reason: "size must be at least 1".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(TopoError::BadArgument {
            template,
            reason: format!("'{}': {}", raw, e),
        }),
    }
}

impl TopoSpec {
    /// Populate `topo` with this template.
    pub fn build(self, topo: &Topology) -> Result<(), TopoError> {
        match self {
            TopoSpec::Minimal => build_single(topo, 2)?,
            TopoSpec::Single(hosts) => build_single(topo, hosts)?,
            TopoSpec::Linear(switches) => build_linear(topo, switches)?,
            TopoSpec::Tree { depth, fanout } => {
                let mut counters = TreeCounters::default();
                add_tree(topo, depth, fanout, &mut counters)?;
            }
        }
        topo.add_controller("c0")?;
        Ok(())
    }
}

fn build_single(topo: &Topology, hosts: u32) -> Result<(), ModelError> {
    topo.add_switch("s1")?;
    for i in 1..=hosts {
        let host = format!("h{}", i);
        topo.add_host(host.as_str())?;
        topo.add_link(&host, "s1")?;
    }
    Ok(())
}

fn build_linear(topo: &Topology, switches: u32) -> Result<(), ModelError> {
    let mut previous: Option<String> = None;
    for i in 1..=switches {
        let host = format!("h{}", i);
        let switch = format!("s{}", i);
        topo.add_host(host.as_str())?;
        topo.add_switch(switch.as_str())?;
        topo.add_link(&host, &switch)?;
        if let Some(prev) = previous.take() {
            topo.add_link(&switch, &prev)?;
        }
        previous = Some(switch);
    }
    Ok(())
}

#[derive(Default)]
struct TreeCounters {
    switches: u32,
    hosts: u32,
}

/// Depth-first: switches above depth 0, hosts at the leaves.
fn add_tree(
    topo: &Topology,
    depth: u32,
    fanout: u32,
    counters: &mut TreeCounters,
) -> Result<String, ModelError> {
    if depth == 0 {
        counters.hosts += 1;
        let host = format!("h{}", counters.hosts);
        topo.add_host(host.as_str())?;
        return Ok(host);
    }

    counters.switches += 1;
    let switch = format!("s{}", counters.switches);
    topo.add_switch(switch.as_str())?;
    for _ in 0..fanout {
        let child = add_tree(topo, depth - 1, fanout, counters)?;
        topo.add_link(&switch, &child)?;
    }
    Ok(switch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use topolens::{Link, TopologyView};

    fn build(spec: &str) -> Topology {
        let topo = Topology::new();
        spec.parse::<TopoSpec>()
            .expect("parse")
            .build(&topo)
            .expect("build");
        topo
    }

    #[test]
    fn test_parse() {
        assert_eq!("minimal".parse::<TopoSpec>().expect("minimal"), TopoSpec::Minimal);
        assert_eq!("single,4".parse::<TopoSpec>().expect("single"), TopoSpec::Single(4));
        assert_eq!("linear".parse::<TopoSpec>().expect("linear"), TopoSpec::Linear(2));
        assert_eq!(
            "tree, 2, 3".parse::<TopoSpec>().expect("tree"),
            TopoSpec::Tree {
                depth: 2,
                fanout: 3
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("ring,3".parse::<TopoSpec>(), Err(TopoError::Unknown(_))));
        assert!(matches!(
            "single,0".parse::<TopoSpec>(),
            Err(TopoError::BadArgument { .. })
        ));
        assert!(matches!(
            "linear,x".parse::<TopoSpec>(),
            Err(TopoError::BadArgument { .. })
        ));
        assert!(matches!(
            "minimal,1".parse::<TopoSpec>(),
            Err(TopoError::BadArgument { .. })
        ));
    }

    #[test]
    fn test_minimal() {
        let topo = build("minimal");
        assert_eq!(topo.list_nodes(), vec!["h1", "h2", "s1", "c0"]);
        assert_eq!(
            topo.list_links(),
            vec![Link::new("h1-eth0", "s1-eth1"), Link::new("h2-eth0", "s1-eth2")]
        );
    }

    #[test]
    fn test_linear() {
        let topo = build("linear,3");
        assert_eq!(topo.list_hosts(), vec!["h1", "h2", "h3"]);
        assert_eq!(topo.list_switches(), vec!["s1", "s2", "s3"]);
        assert_eq!(topo.list_links().len(), 5);
        assert_eq!(topo.list_links()[2], Link::new("s2-eth2", "s1-eth2"));
    }

    #[test]
    fn test_tree() {
        let topo = build("tree,2,2");
        assert_eq!(topo.list_switches(), vec!["s1", "s2", "s3"]);
        assert_eq!(topo.list_hosts(), vec!["h1", "h2", "h3", "h4"]);
        assert_eq!(topo.list_links().len(), 6);
        assert_eq!(topo.list_controllers(), vec!["c0"]);
    }
}
