use fabric_tx_types::{EndorsementSelection, NodeDescriptor};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

use crate::EndorsementLayout;

/// Pick the peers to endorse with from the discovered layouts.
///
/// Only satisfiable layouts are considered. Within the chosen layout each
/// group contributes `required` distinct peers drawn at random, which spreads
/// load across equally valid peer sets. A peer listed in several groups is
/// counted once, so a layout whose groups cannot be filled from distinct
/// peers is skipped in favour of the next candidate. Returns `None` when no
/// layout can be satisfied.
pub fn select_peers<R: Rng + ?Sized>(
    layouts: &[EndorsementLayout],
    selection: EndorsementSelection,
    rng: &mut R,
) -> Option<Vec<NodeDescriptor>> {
    let mut candidates: Vec<&EndorsementLayout> =
        layouts.iter().filter(|l| l.is_satisfiable()).collect();

    while !candidates.is_empty() {
        let index = pick_layout(&candidates, selection, rng)?;
        let layout = candidates.swap_remove(index);

        match draw_distinct(layout, rng) {
            Some(selected) => return Some(selected),
            None => debug!(
                required = layout.required_peers(),
                "Layout cannot be met by distinct peers"
            ),
        }
    }

    None
}

fn pick_layout<R: Rng + ?Sized>(
    candidates: &[&EndorsementLayout],
    selection: EndorsementSelection,
    rng: &mut R,
) -> Option<usize> {
    let indices: Vec<usize> = match selection {
        EndorsementSelection::Random => (0..candidates.len()).collect(),
        EndorsementSelection::FewestPeers => {
            let fewest = candidates.iter().map(|l| l.required_peers()).min()?;
            (0..candidates.len())
                .filter(|&i| candidates[i].required_peers() == fewest)
                .collect()
        }
    };
    indices.choose(rng).copied()
}

/// Exactly `required_peers()` distinct peers, or `None`.
///
/// Groups with the least slack draw first.
fn draw_distinct<R: Rng + ?Sized>(
    layout: &EndorsementLayout,
    rng: &mut R,
) -> Option<Vec<NodeDescriptor>> {
    let mut groups: Vec<_> = layout.groups.iter().collect();
    groups.sort_by_key(|g| g.peers.len().saturating_sub(g.required));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut selected = Vec::with_capacity(layout.required_peers());
    for group in groups {
        let mut names = HashSet::new();
        let available: Vec<&NodeDescriptor> = group
            .peers
            .iter()
            .filter(|p| !seen.contains(p.name.as_str()) && names.insert(p.name.as_str()))
            .collect();
        if available.len() < group.required {
            return None;
        }

        for &peer in available.choose_multiple(rng, group.required) {
            seen.insert(peer.name.as_str());
            selected.push(peer.clone());
        }
    }

    Some(selected)
}
