//! Shared type definitions for the SHDWNET signal fusion pipeline.
//!
//! This crate is the single source of truth for the values that flow
//! between the feed adapters, the fusion core and the display collaborator.
//! Types flow downstream to `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`enums`] -- Sources, statuses, classifications, sigils, tiers
//! - [`structs`] -- Feed readings, celestial state, master signal, snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AspectKind, Body, FeedStatus, FlareClass, GeomagneticActivity, MoonPhase,
    PLASMA_FALLBACK_SPEED, Severity, Sigil, SignalTier, SourceId, StrategyKind, UnknownSource,
};
pub use ids::CycleId;
pub use structs::{
    Aspect, CelestialState, CycleSnapshot, FeedReading, LogEvent, MasterSignal, PlasmaSample,
    PlasmaSignals, RawMetrics,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings to `bindings/` relative to the crate
        // root when `export_all` runs.
        use ts_rs::TS;

        let _ = crate::ids::CycleId::export_all();

        let _ = crate::enums::SourceId::export_all();
        let _ = crate::enums::FeedStatus::export_all();
        let _ = crate::enums::FlareClass::export_all();
        let _ = crate::enums::GeomagneticActivity::export_all();
        let _ = crate::enums::MoonPhase::export_all();
        let _ = crate::enums::Body::export_all();
        let _ = crate::enums::AspectKind::export_all();
        let _ = crate::enums::Sigil::export_all();
        let _ = crate::enums::SignalTier::export_all();
        let _ = crate::enums::StrategyKind::export_all();
        let _ = crate::enums::Severity::export_all();

        let _ = crate::structs::PlasmaSample::export_all();
        let _ = crate::structs::PlasmaSignals::export_all();
        let _ = crate::structs::RawMetrics::export_all();
        let _ = crate::structs::FeedReading::export_all();
        let _ = crate::structs::Aspect::export_all();
        let _ = crate::structs::CelestialState::export_all();
        let _ = crate::structs::MasterSignal::export_all();
        let _ = crate::structs::CycleSnapshot::export_all();
        let _ = crate::structs::LogEvent::export_all();
    }
}
