//! Request classification rules
//!
//! The gateway decides which caching strategy applies to a request by
//! evaluating an explicit, ordered list of (predicate, strategy) rules —
//! first match wins. The table is plain data: it can be inspected, logged,
//! and unit-tested without a gateway around it.

use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;
use crate::traits::Request;

/// Caching strategy applied to a classified request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Always network, never cached, never intercepted
    Bypass,
    /// Serve from the long-lived partition, fill it on miss
    StaticFirst,
    /// Serve stale from cache while refreshing in the background
    StaleWhileRevalidate,
    /// Network first, cache and offline placeholder as fallback
    NetworkFirst,
}

/// Predicate half of a classification rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePredicate {
    /// The request host contains any of these substrings
    HostContains(Vec<String>),
    /// The request path contains any of these substrings
    PathContains(Vec<String>),
    /// Matches every request
    Any,
}

impl RoutePredicate {
    /// Whether this predicate matches a request
    pub fn matches(&self, req: &Request) -> bool {
        match self {
            RoutePredicate::HostContains(hosts) => {
                let host = req.host();
                hosts.iter().any(|h| host.contains(h.as_str()))
            }
            RoutePredicate::PathContains(paths) => {
                let path = req.path();
                paths.iter().any(|p| path.contains(p.as_str()))
            }
            RoutePredicate::Any => true,
        }
    }
}

/// One classification rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// When this rule applies
    pub predicate: RoutePredicate,
    /// The strategy it selects
    pub strategy: Strategy,
}

impl RouteRule {
    /// Create a rule
    pub fn new(predicate: RoutePredicate, strategy: Strategy) -> Self {
        Self {
            predicate,
            strategy,
        }
    }
}

/// Ordered rule table, evaluated top to bottom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<RouteRule>,
}

impl RuleSet {
    /// Create a rule set from an explicit rule list
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Build the standard table from gateway configuration
    ///
    /// Priority order: backend hosts bypass everything, then static asset
    /// paths, then locale data paths, then the network-first default.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut rules = Vec::new();
        if !config.bypass_hosts.is_empty() {
            rules.push(RouteRule::new(
                RoutePredicate::HostContains(config.bypass_hosts.clone()),
                Strategy::Bypass,
            ));
        }
        if !config.static_path_patterns.is_empty() {
            rules.push(RouteRule::new(
                RoutePredicate::PathContains(config.static_path_patterns.clone()),
                Strategy::StaticFirst,
            ));
        }
        if !config.locale_path_patterns.is_empty() {
            rules.push(RouteRule::new(
                RoutePredicate::PathContains(config.locale_path_patterns.clone()),
                Strategy::StaleWhileRevalidate,
            ));
        }
        rules.push(RouteRule::new(RoutePredicate::Any, Strategy::NetworkFirst));
        Self { rules }
    }

    /// Classify a request
    ///
    /// Falls back to [`Strategy::NetworkFirst`] when no rule matches.
    pub fn classify(&self, req: &Request) -> Strategy {
        self.rules
            .iter()
            .find(|rule| rule.predicate.matches(req))
            .map(|rule| rule.strategy)
            .unwrap_or(Strategy::NetworkFirst)
    }

    /// The underlying rule table
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}
