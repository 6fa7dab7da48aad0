/// Union-find over cell indices, tracking which cells are already connected.
///
/// Uses union by rank and path compression, so both operations run in
/// amortized near-constant time and `find` never recurses.
pub struct RegionTracker {
    parent: Vec<u32>,
    rank: Vec<u8>,
    regions: usize,
}

impl RegionTracker {
    /// One region per cell, region `i` holding cell `i`.
    pub fn new(size: usize) -> Self {
        RegionTracker {
            parent: (0..size as u32).collect(),
            rank: vec![0; size],
            regions: size,
        }
    }

    /// Number of disjoint regions left.
    pub fn region_count(&self) -> usize {
        self.regions
    }

    /// Representative id of the region containing `x`.
    pub fn find(&mut self, x: usize) -> u32 {
        let mut root = x as u32;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Point everything on the way directly at the root
        let mut node = x as u32;
        while node != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }
        root
    }

    /// Joins the regions of `x` and `y`.
    ///
    /// # Returns
    /// `Some((loser, winner))` with the ids of the absorbed and the surviving
    /// region, or `None` if both were already in the same region
    pub fn union(&mut self, x: usize, y: usize) -> Option<(u32, u32)> {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return None;
        }

        let (loser, winner) = match self.rank[root_x as usize].cmp(&self.rank[root_y as usize]) {
            std::cmp::Ordering::Greater => (root_y, root_x),
            std::cmp::Ordering::Less => (root_x, root_y),
            std::cmp::Ordering::Equal => {
                self.rank[root_x as usize] += 1;
                (root_y, root_x)
            }
        };
        self.parent[loser as usize] = winner;
        self.regions -= 1;
        Some((loser, winner))
    }
}
