//! Business-policy parameters for identity verification.

use serde::{Deserialize, Serialize};

/// Policy knobs applied by the reconciler and the session gateway.
///
/// Defaults match production policy; tests and the TOML config may override them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycParams {
    /// Minimum face-match confidence (0..=100) for an accepted verdict to count.
    #[serde(default = "default_face_match_threshold")]
    pub face_match_threshold: u8,

    /// Rule-driven rejections after which the account is suspended.
    #[serde(default = "default_max_rejections")]
    pub max_rejections: u32,

    /// Points credited to both referrer and referred account on first verification.
    #[serde(default = "default_referral_bonus_points")]
    pub referral_bonus_points: u64,

    /// Leading component of every session reference.
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,
}

fn default_face_match_threshold() -> u8 {
    80
}

fn default_max_rejections() -> u32 {
    5
}

fn default_referral_bonus_points() -> u64 {
    50
}

fn default_reference_prefix() -> String {
    "kyc".to_string()
}

impl KycParams {
    /// Attempts left after `rejection_count` rule-driven rejections.
    pub fn remaining_attempts(&self, rejection_count: u32) -> u32 {
        self.max_rejections.saturating_sub(rejection_count)
    }
}

impl Default for KycParams {
    fn default() -> Self {
        Self {
            face_match_threshold: default_face_match_threshold(),
            max_rejections: default_max_rejections(),
            referral_bonus_points: default_referral_bonus_points(),
            reference_prefix: default_reference_prefix(),
        }
    }
}
