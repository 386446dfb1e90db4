//! Author grouping over the loaded story sequence.

use std::collections::HashMap;

use store::Story;
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq)]
struct AuthorGroup {
    /// Position of the author in [`StoryIndex::authors`].
    rank: usize,
    /// Global indices of the author's stories, in sequence order.
    indices: Vec<usize>,
}

/// Precomputed lookup from authors to their stories.
///
/// Authors are ordered by the first appearance of any of their stories in the
/// loaded sequence. Rebuilt whenever the sequence changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoryIndex {
    authors: Vec<Uuid>,
    groups: HashMap<Uuid, AuthorGroup>,
    positions: HashMap<Uuid, usize>,
}

impl StoryIndex {
    pub fn build(stories: &[Story]) -> Self {
        let mut index = Self::default();
        for (i, story) in stories.iter().enumerate() {
            index.positions.insert(story.id, i);
            let next_rank = index.authors.len();
            let group = index.groups.entry(story.author_id).or_insert_with(|| AuthorGroup {
                rank: next_rank,
                indices: Vec::new(),
            });
            if group.indices.is_empty() {
                index.authors.push(story.author_id);
            }
            group.indices.push(i);
        }
        index
    }

    /// Authors in playback order.
    pub fn authors(&self) -> &[Uuid] {
        &self.authors
    }

    /// Global index of a story.
    pub fn position(&self, story_id: Uuid) -> Option<usize> {
        self.positions.get(&story_id).copied()
    }

    /// Global indices of an author's stories; empty for unknown authors.
    pub fn stories_of(&self, author: Uuid) -> &[usize] {
        self.groups
            .get(&author)
            .map(|g| g.indices.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_author(&self, author: Uuid) -> Option<Uuid> {
        let rank = self.groups.get(&author)?.rank;
        self.authors.get(rank + 1).copied()
    }

    pub fn previous_author(&self, author: Uuid) -> Option<Uuid> {
        let rank = self.groups.get(&author)?.rank;
        rank.checked_sub(1).and_then(|r| self.authors.get(r).copied())
    }
}
