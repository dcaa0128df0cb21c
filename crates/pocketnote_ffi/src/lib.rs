//! Flutter-facing bridge over `pocketnote_core`.

pub mod api;
