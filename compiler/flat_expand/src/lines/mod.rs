//! Source lines for positions in pasted-up text.
//!
//! Pasted text interleaves copied source with synthesized code. A
//! [`LineMap`] is a list of runs sorted by offset. Inside a *source* run the
//! line advances with every newline; inside a *fixed* run every position
//! reports the line of the definition that produced it.

use crate::scan::count_lines;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Flow {
    Source,
    Fixed,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct Run {
    offset: usize,
    line: u32,
    flow: Flow,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LineMap {
    runs: Vec<Run>,
}

impl Default for LineMap {
    fn default() -> Self {
        Self::new()
    }
}

impl LineMap {
    /// Plain text starting at line 1.
    pub fn new() -> Self {
        Self::with_first_run(1, Flow::Source)
    }

    /// Text that reports `line` everywhere until told otherwise.
    pub fn fixed(line: u32) -> Self {
        Self::with_first_run(line, Flow::Fixed)
    }

    fn with_first_run(line: u32, flow: Flow) -> Self {
        LineMap {
            runs: vec![Run {
                offset: 0,
                line,
                flow,
            }],
        }
    }

    /// From `offset` on, lines count up from `line` with the text.
    pub fn source_from(&mut self, offset: usize, line: u32) {
        self.push(Run {
            offset,
            line,
            flow: Flow::Source,
        });
    }

    /// From `offset` on, every position is on `line`.
    pub fn fixed_from(&mut self, offset: usize, line: u32) {
        self.push(Run {
            offset,
            line,
            flow: Flow::Fixed,
        });
    }

    /// Append the runs of `other`, a map of text inserted at `offset`.
    pub fn splice(&mut self, offset: usize, other: &LineMap) {
        for run in &other.runs {
            self.push(Run {
                offset: offset + run.offset,
                ..*run
            });
        }
    }

    /// Offsets never decrease; a run at the same offset replaces the last.
    fn push(&mut self, run: Run) {
        match self.runs.last_mut() {
            Some(last) if last.offset >= run.offset => *last = run,
            _ => self.runs.push(run),
        }
    }

    /// Line of byte `pos` of `text`, the text this map describes.
    pub fn line_at(&self, text: &str, pos: usize) -> u32 {
        LineCursor::new(self).at(text.as_bytes(), pos)
    }
}

/// Line lookups at mostly increasing positions of one text.
pub(crate) struct LineCursor<'m> {
    runs: &'m [Run],
    next: usize,
    pos: usize,
    line: u32,
    flow: Flow,
}

impl<'m> LineCursor<'m> {
    pub(crate) fn new(map: &'m LineMap) -> Self {
        LineCursor {
            runs: &map.runs,
            next: 0,
            pos: 0,
            line: 1,
            flow: Flow::Source,
        }
    }

    pub(crate) fn at(&mut self, bytes: &[u8], pos: usize) -> u32 {
        if pos < self.pos {
            self.next = 0;
            self.pos = 0;
            self.line = 1;
            self.flow = Flow::Source;
        }
        let runs = self.runs;
        while let Some(run) = runs.get(self.next).filter(|run| run.offset <= pos) {
            self.pos = run.offset;
            self.line = run.line;
            self.flow = run.flow;
            self.next += 1;
        }
        if self.flow == Flow::Source {
            let end = pos.min(bytes.len());
            if let Some(skipped) = bytes.get(self.pos..end) {
                self.line += count_lines(skipped);
            }
        }
        self.pos = pos;
        self.line
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
