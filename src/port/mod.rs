//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                  ┌──────────────────────────┐
//!   CLI / HTTP ───▶│  inbound::AgentFacade    │
//!                  │                          │
//!                  │  Application             │
//!                  └──┬─────────┬─────────┬───┘
//!                     ▼         ▼         ▼
//!                 ┌───────┐ ┌────────┐ ┌───────┐
//!                 │Ledger │ │Registry│ │Advisor│──▶ Llm
//!                 └───────┘ └────────┘ └───────┘
//! ```

pub mod inbound;
pub mod outbound;
