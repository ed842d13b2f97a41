// SPDX-License-Identifier: MIT

agentgate_core::define_id! {
    /// Identifies one live subscriber socket handed out by [`crate::Broadcaster::register`].
    pub struct ConnectionId("conn-");
}
