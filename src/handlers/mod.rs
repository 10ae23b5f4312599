// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token required)
pub mod public;    // Tier 1: /, /health, /api/auth/*, /api/search/*
pub mod protected; // Tier 2: /api/listings/*
