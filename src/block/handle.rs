//! `BlockHandleTuple` groupings (spec §4.G `getHandleTuples`): consecutive runs of
//! `tupleSize` addresses from a CBL, paired with the companion checksums recovered
//! from the block store (spec §3 Open Question 1).

use crate::checksum::Checksum;

/// One reconstruction group: a prime-whitened checksum plus its companions, in the
/// fixed XOR order `source ⊕ randoms ⊕ whiteners` used to build the tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHandleTuple {
    pub prime: Checksum,
    pub companions: Vec<Checksum>,
}

impl BlockHandleTuple {
    pub fn tuple_size(&self) -> usize {
        self.companions.len() + 1
    }
}

/// Split a CBL's flat address list into `tupleSize`-wide groups, looking up each
/// prime's companions via `lookup`. Returns `None` for any prime the store can't
/// resolve, preserving index alignment with the input address list.
pub fn handle_tuples_from_addresses<F>(
    addresses: &[Checksum],
    mut lookup: F,
) -> Vec<Option<BlockHandleTuple>>
where
    F: FnMut(&Checksum) -> Option<Vec<Checksum>>,
{
    addresses
        .iter()
        .map(|prime| {
            lookup(prime).map(|companions| BlockHandleTuple {
                prime: *prime,
                companions,
            })
        })
        .collect()
}
