use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// The closed set of combat elements. Every creature and every action carries
/// exactly one element; the pairing of attacker and defender elements feeds a
/// damage multiplier through [`advantage`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Element {
    Neutral,
    Ember,
    Tide,
    Bloom,
    Gale,
    Stone,
    Volt,
    Frost,
}

/// Elemental advantage multiplier for an attacker element striking a defender
/// element. 2.0 for a strong matchup, 0.5 for a resisted one, 1.0 otherwise.
///
/// The matrix is intentionally asymmetric: Ember scorching Bloom does not
/// imply Bloom is weak into Ember from both directions.
pub fn advantage(attacker: Element, defender: Element) -> f32 {
    use Element::*;
    match (attacker, defender) {
        // Strong matchups
        (Ember, Bloom) | (Ember, Frost) => 2.0,
        (Tide, Ember) | (Tide, Stone) => 2.0,
        (Bloom, Tide) | (Bloom, Stone) => 2.0,
        (Gale, Bloom) => 2.0,
        (Stone, Volt) | (Stone, Ember) => 2.0,
        (Volt, Tide) | (Volt, Gale) => 2.0,
        (Frost, Bloom) | (Frost, Gale) => 2.0,
        // Resisted matchups
        (Ember, Tide) | (Ember, Stone) => 0.5,
        (Tide, Bloom) | (Tide, Volt) => 0.5,
        (Bloom, Ember) | (Bloom, Gale) => 0.5,
        (Gale, Volt) | (Gale, Frost) => 0.5,
        (Stone, Tide) | (Stone, Bloom) => 0.5,
        (Volt, Stone) => 0.5,
        (Frost, Ember) => 0.5,
        _ => 1.0,
    }
}
