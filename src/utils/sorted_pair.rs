use core::cmp::PartialOrd;

/// A pair of elements sorted in increasing order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SortedPair<T: PartialOrd>([T; 2]);

impl<T: PartialOrd> SortedPair<T> {
    /// Sorts two elements in increasing order into a new pair.
    pub fn new(element1: T, element2: T) -> Self {
        if element1 > element2 {
            SortedPair([element2, element1])
        } else {
            SortedPair([element1, element2])
        }
    }

    /// The smallest element of the pair.
    pub fn first(&self) -> &T {
        &self.0[0]
    }

    /// The largest element of the pair.
    pub fn second(&self) -> &T {
        &self.0[1]
    }
}

#[cfg(test)]
mod test {
    use super::SortedPair;

    #[test]
    fn sorted_pair_is_order_independent() {
        assert_eq!(SortedPair::new(3u32, 1), SortedPair::new(1, 3));
        assert_eq!(*SortedPair::new(7u32, 2).first(), 2);
        assert_eq!(*SortedPair::new(7u32, 2).second(), 7);
    }
}
