//! Pagination: greedy packing of measured blocks into viewport-fitted pages

use crate::content::BlockId;
use crate::layout::measure::BlockMetrics;
use smallvec::SmallVec;

/// Blocks assigned to one display page, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    blocks: SmallVec<[BlockId; 8]>,
    /// Sum of the block heights charged to this page
    height: f32,
}

impl Page {
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains(&id)
    }

    fn push(&mut self, metrics: &BlockMetrics) {
        self.blocks.push(metrics.id);
        self.height += metrics.height();
    }
}

/// Pages for the current viewport geometry. Never empty: a wholly empty
/// input yields one empty page so index 0 is always valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pages: Vec<Page>,
    budget: f32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            pages: vec![Page::default()],
            budget: 0.0,
        }
    }
}

impl Pagination {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always false, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Page height budget the pages were packed against
    pub fn budget(&self) -> f32 {
        self.budget
    }

    /// Index of the page holding `id`
    pub fn page_of(&self, id: BlockId) -> Option<usize> {
        self.pages.iter().position(|page| page.contains(id))
    }

    /// Every block id across all pages, in order
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.pages.iter().flat_map(|page| page.blocks.iter().copied())
    }
}

/// Split measured blocks into pages of at most `budget` height.
///
/// Walks blocks in document order and closes the running page when the next
/// block would overflow it. A block only moves to a new page if the current
/// one already holds something, so an oversized block sits alone on its own
/// page instead of being dropped.
pub fn paginate(blocks: &[BlockMetrics], budget: f32) -> Pagination {
    let mut pages = Vec::new();
    let mut current = Page::default();

    for metrics in blocks {
        let height = metrics.height();
        if current.height + height > budget && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
        }
        current.push(metrics);
    }

    // Also covers empty input: one empty page
    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }

    log::debug!(
        "paginated {} blocks into {} pages (budget {budget})",
        blocks.len(),
        pages.len()
    );

    Pagination { pages, budget }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(heights: &[f32]) -> Vec<BlockMetrics> {
        heights
            .iter()
            .enumerate()
            .map(|(idx, &h)| BlockMetrics::new(BlockId(idx as u32), h, 0.0))
            .collect()
    }

    fn shape(pagination: &Pagination) -> Vec<Vec<u32>> {
        pagination
            .pages()
            .iter()
            .map(|page| page.blocks().iter().map(|id| id.0).collect())
            .collect()
    }

    #[test]
    fn test_exact_fit() {
        let pagination = paginate(&blocks(&[100.0, 100.0, 100.0]), 300.0);
        assert_eq!(shape(&pagination), vec![vec![0, 1, 2]]);
        assert_eq!(pagination.pages()[0].height(), 300.0);
    }

    #[test]
    fn test_overflow_split() {
        let pagination = paginate(&blocks(&[100.0, 100.0, 150.0]), 150.0);
        assert_eq!(shape(&pagination), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_oversized_block_alone() {
        let pagination = paginate(&blocks(&[500.0]), 300.0);
        assert_eq!(shape(&pagination), vec![vec![0]]);
    }

    #[test]
    fn test_oversized_block_between_others() {
        let pagination = paginate(&blocks(&[100.0, 500.0, 100.0]), 300.0);
        assert_eq!(shape(&pagination), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_empty_input_single_empty_page() {
        let pagination = paginate(&[], 300.0);
        assert_eq!(pagination.len(), 1);
        assert!(pagination.pages()[0].is_empty());
        assert_eq!(pagination.last_index(), 0);
        assert_eq!(pagination.budget(), 300.0);
    }

    #[test]
    fn test_margins_count_against_budget() {
        let metrics = vec![
            BlockMetrics::new(BlockId(0), 90.0, 10.0),
            BlockMetrics::new(BlockId(1), 90.0, 10.0),
            BlockMetrics::new(BlockId(2), 90.0, 10.0),
        ];
        let pagination = paginate(&metrics, 250.0);
        assert_eq!(shape(&pagination), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_zero_budget_terminates() {
        let pagination = paginate(&blocks(&[10.0, 10.0]), 0.0);
        assert_eq!(shape(&pagination), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_page_of() {
        let pagination = paginate(&blocks(&[100.0, 100.0, 100.0]), 200.0);
        assert_eq!(pagination.page_of(BlockId(0)), Some(0));
        assert_eq!(pagination.page_of(BlockId(2)), Some(1));
        assert_eq!(pagination.page_of(BlockId(9)), None);
        assert_eq!(pagination.block_ids().count(), 3);
    }
}
