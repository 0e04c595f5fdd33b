use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use super::Event;

/// Result of merging the sequences of one flow.
#[derive(Debug)]
pub enum Merged<I> {
    Empty,
    /// A lone input passes through untouched, without the `until` cutoff.
    Single(I),
    Many(MergeEvents<I>),
}

/// Combines `inputs` into one chronological sequence, coalescing events that
/// share an offset and stopping at the first offset `>= until`.
#[must_use]
pub fn merge<I>(mut inputs: Vec<I>, until: Option<Duration>) -> Merged<I>
where
    I: Iterator<Item = Event>,
{
    if inputs.len() > 1 {
        return Merged::Many(MergeEvents::new(inputs, until));
    }
    inputs.pop().map_or(Merged::Empty, Merged::Single)
}

impl<I> Iterator for Merged<I>
where
    I: Iterator<Item = Event>,
{
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Empty => None,
            Self::Single(input) => input.next(),
            Self::Many(merged) => merged.next(),
        }
    }
}

/// Heads are kept in a min-heap keyed by `(offset, input index)`; the
/// scratch buffer holds the inputs to advance after a step.
#[derive(Debug)]
pub struct MergeEvents<I> {
    inputs: Vec<I>,
    heads: BinaryHeap<Reverse<(Duration, usize, u64)>>,
    scratch: Vec<usize>,
    until: Option<Duration>,
}

impl<I> MergeEvents<I>
where
    I: Iterator<Item = Event>,
{
    fn new(mut inputs: Vec<I>, until: Option<Duration>) -> Self {
        let mut heads = BinaryHeap::with_capacity(inputs.len());
        for (index, input) in inputs.iter_mut().enumerate() {
            if let Some(event) = input.next() {
                heads.push(Reverse((event.offset, index, event.size)));
            }
        }
        let scratch = Vec::with_capacity(inputs.len());
        Self {
            inputs,
            heads,
            scratch,
            until,
        }
    }
}

impl<I> Iterator for MergeEvents<I>
where
    I: Iterator<Item = Event>,
{
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        let Reverse((offset, _, _)) = *self.heads.peek()?;
        if self.until.is_some_and(|until| offset >= until) {
            self.heads.clear();
            return None;
        }

        let mut size = 0_u64;
        while let Some(Reverse((head_offset, index, head_size))) = self.heads.peek().copied() {
            if head_offset != offset {
                break;
            }
            self.heads.pop();
            size = size.saturating_add(head_size);
            self.scratch.push(index);
        }

        for index in self.scratch.drain(..) {
            let next = self.inputs.get_mut(index).and_then(Iterator::next);
            if let Some(event) = next {
                self.heads.push(Reverse((event.offset, index, event.size)));
            }
        }

        Some(Event::new(offset, size))
    }
}
