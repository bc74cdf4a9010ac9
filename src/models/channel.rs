//! Channel model.
//!
//! Channels are the frequency slots pilots fly on. Two channels interfere
//! when their frequencies are closer than the model's separation threshold
//! (or when explicitly marked). Interference is symmetric but not
//! transitive.
//!
//! Channels are clustered into *channel groups*: one group per physical
//! receiver position, where every member interferes with the group's
//! representative (lowest frequency). A race can carry at most one pilot per
//! group, so the group count is the per-race pilot capacity.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Default minimum spacing (MHz) for two channels to coexist in a heat.
pub const DEFAULT_SEPARATION_MHZ: u32 = 20;

/// Video transmission family of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BandType {
    /// Analog video (Raceband, Fatshark, A/B/E bands, ...).
    Analog,
    /// Digital video systems (DJI, HDZero, Walksnail, ...).
    Digital,
}

/// A single frequency slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Unique channel identifier.
    pub id: String,
    /// Band name (e.g., "R", "F", "DJI").
    pub band: String,
    /// Transmission family.
    pub band_type: BandType,
    /// Channel number within the band.
    pub number: u32,
    /// Centre frequency.
    pub frequency_mhz: u32,
}

impl Channel {
    /// Creates an analog channel.
    pub fn new(
        id: impl Into<String>,
        band: impl Into<String>,
        number: u32,
        frequency_mhz: u32,
    ) -> Self {
        Self {
            id: id.into(),
            band: band.into(),
            band_type: BandType::Analog,
            number,
            frequency_mhz,
        }
    }

    /// Creates a digital channel.
    pub fn digital(
        id: impl Into<String>,
        band: impl Into<String>,
        number: u32,
        frequency_mhz: u32,
    ) -> Self {
        Self {
            band_type: BandType::Digital,
            ..Self::new(id, band, number, frequency_mhz)
        }
    }

    /// Short label such as `R1`.
    pub fn label(&self) -> String {
        format!("{}{}", self.band, self.number)
    }
}

/// The set of channels available to an event, with precomputed
/// interference and channel groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelModel {
    channels: Vec<Channel>,
    separation_mhz: u32,
    extra_pairs: Vec<(String, String)>,
    interference: HashMap<String, Vec<String>>,
    groups: Vec<Vec<String>>,
}

impl ChannelModel {
    /// Creates a model with the default separation threshold.
    pub fn new(channels: Vec<Channel>) -> Self {
        Self::with_separation(channels, DEFAULT_SEPARATION_MHZ)
    }

    /// Creates a model with a custom separation threshold (MHz).
    pub fn with_separation(channels: Vec<Channel>, separation_mhz: u32) -> Self {
        let mut model = Self {
            channels,
            separation_mhz,
            extra_pairs: Vec::new(),
            interference: HashMap::new(),
            groups: Vec::new(),
        };
        model.rebuild();
        model
    }

    /// Marks two channels as interfering regardless of frequency.
    pub fn with_interference(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.extra_pairs.push((a.into(), b.into()));
        self.rebuild();
        self
    }

    fn rebuild(&mut self) {
        let interference: HashMap<String, Vec<String>> = self
            .channels
            .iter()
            .map(|a| {
                let others = self
                    .channels
                    .iter()
                    .filter(|b| b.id != a.id && self.close(a, b))
                    .map(|b| b.id.clone())
                    .collect();
                (a.id.clone(), others)
            })
            .collect();
        self.interference = interference;

        let mut order: Vec<usize> = (0..self.channels.len()).collect();
        order.sort_by_key(|&i| self.channels[i].frequency_mhz);

        let mut groups: Vec<Vec<String>> = Vec::new();
        for i in order {
            let id = &self.channels[i].id;
            match groups.iter_mut().find(|g| self.interferes(&g[0], id)) {
                Some(group) => group.push(id.clone()),
                None => groups.push(vec![id.clone()]),
            }
        }
        self.groups = groups;
    }

    fn close(&self, a: &Channel, b: &Channel) -> bool {
        let explicit = self
            .extra_pairs
            .iter()
            .any(|(x, y)| (x == &a.id && y == &b.id) || (x == &b.id && y == &a.id));
        explicit
            || a.frequency_mhz == b.frequency_mhz
            || a.frequency_mhz.abs_diff(b.frequency_mhz) < self.separation_mhz
    }

    /// All channels in input order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the model has no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Looks up a channel by ID.
    pub fn get(&self, id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Whether the channel belongs to this model.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Band type of a channel, if known.
    pub fn band_type_of(&self, id: &str) -> Option<BandType> {
        self.get(id).map(|c| c.band_type)
    }

    /// Whether two *distinct* channels interfere.
    pub fn interferes(&self, a: &str, b: &str) -> bool {
        a != b
            && self
                .interference
                .get(a)
                .is_some_and(|others| others.iter().any(|o| o == b))
    }

    /// Whether two channels cannot fly in the same heat (equal or interfering).
    pub fn shares_frequency(&self, a: &str, b: &str) -> bool {
        a == b || self.interferes(a, b)
    }

    /// Channels that interfere with `id` (empty for unknown channels).
    pub fn interfering_channels(&self, id: &str) -> &[String] {
        self.interference
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Channel groups, ordered by representative frequency.
    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    /// Per-race pilot capacity.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Index of the group containing `id`.
    pub fn group_of(&self, id: &str) -> Option<usize> {
        self.groups
            .iter()
            .position(|g| g.iter().any(|member| member == id))
    }

    /// Representative channel of a group.
    pub fn representative(&self, group: usize) -> Option<&Channel> {
        self.groups
            .get(group)
            .and_then(|g| g.first())
            .and_then(|id| self.get(id))
    }

    /// Distinct band types present, in `BandType` order.
    pub fn band_types(&self) -> Vec<BandType> {
        self.channels
            .iter()
            .map(|c| c.band_type)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Channels of one band type, in input order.
    pub fn channels_of_type(&self, band_type: BandType) -> Vec<&Channel> {
        self.channels
            .iter()
            .filter(|c| c.band_type == band_type)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_model() -> ChannelModel {
        ChannelModel::new(vec![
            Channel::new("R1", "R", 1, 5658),
            Channel::new("R2", "R", 2, 5695),
            Channel::digital("D1", "DJI", 1, 5660),
            Channel::new("R8", "R", 8, 5917),
        ])
    }

    #[test]
    fn test_interference_is_symmetric() {
        let m = mixed_model();
        assert!(m.interferes("R1", "D1"));
        assert!(m.interferes("D1", "R1"));
        assert!(!m.interferes("R1", "R2"));
        assert!(!m.interferes("R1", "R1"));
        assert!(m.shares_frequency("R1", "R1"));
        assert_eq!(m.interfering_channels("R1"), ["D1".to_string()]);
        assert!(m.interfering_channels("nope").is_empty());
    }

    #[test]
    fn test_groups_cluster_by_representative() {
        let m = mixed_model();
        assert_eq!(m.group_count(), 3);
        assert_eq!(m.groups()[0], vec!["R1".to_string(), "D1".to_string()]);
        assert_eq!(m.group_of("D1"), Some(0));
        assert_eq!(m.group_of("R8"), Some(2));
        assert_eq!(m.representative(1).map(|c| c.id.as_str()), Some("R2"));
    }

    #[test]
    fn test_explicit_interference() {
        let m = mixed_model().with_interference("R2", "R8");
        assert!(m.interferes("R8", "R2"));
        assert_eq!(m.group_count(), 2);
    }

    #[test]
    fn test_band_types() {
        let m = mixed_model();
        assert_eq!(m.band_types(), vec![BandType::Analog, BandType::Digital]);
        assert_eq!(m.channels_of_type(BandType::Digital).len(), 1);
        assert_eq!(m.band_type_of("D1"), Some(BandType::Digital));
        assert_eq!(m.get("R8").map(Channel::label), Some("R8".to_string()));
    }

    #[test]
    fn test_zero_separation_still_flags_identical_frequencies() {
        let m = ChannelModel::with_separation(
            vec![
                Channel::new("F4", "F", 4, 5800),
                Channel::new("E9", "E", 9, 5800),
                Channel::new("R5", "R", 5, 5806),
            ],
            0,
        );
        assert!(m.interferes("F4", "E9"));
        assert!(!m.interferes("F4", "R5"));
    }
}
