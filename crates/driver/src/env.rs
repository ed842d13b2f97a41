// SPDX-License-Identifier: MIT

//! Environment construction for spawned agent processes.
//!
//! The spec asks for a clean environment that excludes billing/credential
//! keys via an explicit deny-list, generalized here to a caller-supplied
//! `Vec<String>` rather than a hardcoded vendor list, since provider wire
//! protocols are out of scope for this harness.

use std::collections::HashMap;

pub fn build_env(
    host_env: impl Iterator<Item = (String, String)>,
    deny_list: &[String],
    overlay: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut env: HashMap<String, String> =
        host_env.filter(|(k, _)| !deny_list.iter().any(|d| d.eq_ignore_ascii_case(k))).collect();

    env.insert("NO_COLOR".to_string(), "1".to_string());
    env.insert("FORCE_COLOR".to_string(), "0".to_string());

    for (k, v) in overlay {
        env.insert(k.clone(), v.clone());
    }
    env
}
