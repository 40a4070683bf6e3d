//! Monitored sides and per-side storage.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the two independently monitored sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    /// Both channels, in command emission order
    pub const ALL: [Channel; 2] = [Channel::Left, Channel::Right];

    /// Slot index inside a [`ChannelMap`]
    pub const fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }

    /// Side marker byte.
    ///
    /// Used both as the first payload byte of outgoing commands and as the
    /// side indicator value reported by the sensor.
    pub const fn marker(self) -> u8 {
        match self {
            Channel::Left => 0x41,
            Channel::Right => 0x42,
        }
    }

    /// Resolve a reported side indicator
    pub fn from_marker(marker: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.marker() == marker)
    }

    /// Lowercase label for logs and metric labels
    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::Left => "left",
            Channel::Right => "right",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed two-slot storage indexed by [`Channel`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMap<T>([T; 2]);

impl<T> ChannelMap<T> {
    /// Build a map with one value per channel
    pub fn new(left: T, right: T) -> Self {
        Self([left, right])
    }

    /// Build a map by evaluating `f` for each channel
    pub fn from_fn(mut f: impl FnMut(Channel) -> T) -> Self {
        Self([f(Channel::Left), f(Channel::Right)])
    }

    /// Iterate `(channel, value)` pairs, LEFT first
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &T)> {
        Channel::ALL.into_iter().zip(self.0.iter())
    }

    /// Mutable variant of [`ChannelMap::iter`]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Channel, &mut T)> {
        Channel::ALL.into_iter().zip(self.0.iter_mut())
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> ChannelMap<U> {
        ChannelMap([f(&self.0[0]), f(&self.0[1])])
    }
}

impl<T: Copy> ChannelMap<T> {
    pub fn left(&self) -> T {
        self.0[0]
    }

    pub fn right(&self) -> T {
        self.0[1]
    }
}

impl<T> Index<Channel> for ChannelMap<T> {
    type Output = T;

    fn index(&self, channel: Channel) -> &T {
        &self.0[channel.index()]
    }
}

impl<T> IndexMut<Channel> for ChannelMap<T> {
    fn index_mut(&mut self, channel: Channel) -> &mut T {
        &mut self.0[channel.index()]
    }
}
