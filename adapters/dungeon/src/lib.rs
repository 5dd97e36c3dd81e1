#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reference dungeon adapters for Rogue Chase.
//!
//! [`Dungeon`] is a game oracle with treasure boxes, a hidden prize and
//! trapped boxes. [`Digger`] is a seeded rooms-and-corridors map generator.

mod digger;
mod oracle;

pub use digger::Digger;
pub use oracle::{ActorStats, Dungeon, Tile, TRAP_DAMAGE};
