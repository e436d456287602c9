//! Chart specifications built from canonical distributions.
//!
//! The renderer owns at most one live chart per target. Drawing the specs onto
//! the terminal is done by `tui::chart_view`.

pub mod sample;

use crate::normalize::{Distribution, DistributionKind, StatsSnapshot};
use std::collections::BTreeMap;
use tracing::debug;

pub const NO_DATA_MESSAGE: &str = "No data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
}

/// Where a chart's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Live,
    /// Illustrative placeholder drawn when the whole snapshot is empty.
    Sample,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: u64,
    /// Percent of the visible total.
    pub share: f64,
    pub visible: bool,
}

impl PieSlice {
    pub fn share_label(&self) -> String {
        format!("{:.1}%", self.share)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    /// Value axis lower bound; always zero.
    pub axis_min: u64,
    pub axis_max: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    Pie(Vec<PieSlice>),
    Bar(BarSeries),
    NoData { message: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub body: ChartBody,
    pub origin: DataOrigin,
}

impl ChartSpec {
    pub fn build(title: &str, dist: &Distribution, kind: ChartKind, origin: DataOrigin) -> Self {
        let title = match origin {
            DataOrigin::Live => title.to_string(),
            DataOrigin::Sample => format!("{} (sample data)", title),
        };

        let body = if dist.is_empty() {
            ChartBody::NoData {
                message: NO_DATA_MESSAGE,
            }
        } else {
            match kind {
                ChartKind::Pie => {
                    let mut slices: Vec<PieSlice> = dist
                        .entries()
                        .iter()
                        .map(|(label, value)| PieSlice {
                            label: label.clone(),
                            value: *value,
                            share: 0.0,
                            visible: true,
                        })
                        .collect();
                    recompute_shares(&mut slices);
                    ChartBody::Pie(slices)
                }
                ChartKind::Bar => ChartBody::Bar(BarSeries {
                    labels: dist.entries().iter().map(|(l, _)| l.clone()).collect(),
                    values: dist.entries().iter().map(|(_, v)| *v).collect(),
                    axis_min: 0,
                    axis_max: dist.entries().iter().map(|(_, v)| *v).max().unwrap_or(0),
                }),
            }
        };

        Self {
            kind,
            title,
            body,
            origin,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.body, ChartBody::NoData { .. })
    }
}

fn recompute_shares(slices: &mut [PieSlice]) {
    let total: u64 = slices.iter().filter(|s| s.visible).map(|s| s.value).sum();
    for slice in slices.iter_mut() {
        slice.share = if slice.visible && total > 0 {
            slice.value as f64 / total as f64 * 100.0
        } else {
            0.0
        };
    }
}

/// A chart bound to a target.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    id: u64,
    target: DistributionKind,
    spec: ChartSpec,
}

impl ChartHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn target(&self) -> DistributionKind {
        self.target
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }
}

/// Chart kind used for each dashboard distribution.
pub fn default_kind(target: DistributionKind) -> ChartKind {
    match target {
        DistributionKind::Os | DistributionKind::Hosts => ChartKind::Pie,
        DistributionKind::AttackTypes | DistributionKind::StatusCodes | DistributionKind::TopIps => {
            ChartKind::Bar
        }
    }
}

/// Registry of live charts, at most one per target.
#[derive(Debug, Default)]
pub struct ChartRenderer {
    live: BTreeMap<DistributionKind, ChartHandle>,
    next_id: u64,
    released: u64,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `dist` on `target`, replacing whatever chart the target held.
    pub fn render_categorical(
        &mut self,
        target: DistributionKind,
        dist: &Distribution,
        kind: ChartKind,
    ) -> &ChartHandle {
        let spec = ChartSpec::build(target.title(), dist, kind, DataOrigin::Live);
        self.attach(target, spec)
    }

    /// Redraw every dashboard chart from a snapshot.
    pub fn render_snapshot(&mut self, snapshot: &StatsSnapshot) {
        if snapshot.has_no_distributions() {
            // Nothing usable came back (first run or backend error). Fill the layout
            // with fixed sample datasets; their origin and title mark them as samples.
            debug!("Snapshot has no distributions, drawing sample charts");
            for target in DistributionKind::ALL {
                let spec = ChartSpec::build(
                    target.title(),
                    &sample::dataset(target),
                    default_kind(target),
                    DataOrigin::Sample,
                );
                self.attach(target, spec);
            }
            return;
        }

        for target in DistributionKind::ALL {
            self.render_categorical(target, snapshot.distribution(target), default_kind(target));
        }
    }

    pub fn attach(&mut self, target: DistributionKind, spec: ChartSpec) -> &ChartHandle {
        self.detach(target);
        self.next_id += 1;
        let handle = ChartHandle {
            id: self.next_id,
            target,
            spec,
        };
        self.live.entry(target).or_insert(handle)
    }

    pub fn detach(&mut self, target: DistributionKind) -> Option<ChartHandle> {
        let removed = self.live.remove(&target);
        if removed.is_some() {
            self.released += 1;
        }
        removed
    }

    pub fn get(&self, target: DistributionKind) -> Option<&ChartHandle> {
        self.live.get(&target)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of charts released so far.
    pub fn released(&self) -> u64 {
        self.released
    }

    /// Hide or show one pie slice. Returns the slice's new visibility, or `None`
    /// when the target holds no pie chart or the index is out of range.
    pub fn toggle_legend(&mut self, target: DistributionKind, index: usize) -> Option<bool> {
        let handle = self.live.get_mut(&target)?;
        let ChartBody::Pie(ref mut slices) = handle.spec.body else {
            return None;
        };
        let slice = slices.get_mut(index)?;
        slice.visible = !slice.visible;
        let visible = slice.visible;
        recompute_shares(slices);
        Some(visible)
    }

    pub fn clear(&mut self) {
        let targets: Vec<DistributionKind> = self.live.keys().copied().collect();
        for target in targets {
            self.detach(target);
        }
    }
}
