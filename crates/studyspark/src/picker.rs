//! Four-step range picker: start chapter, start section, end chapter,
//! end section. Each step offers only choices that keep the range valid, and
//! `back` undoes the most recent pick.

use thiserror::Error;

use crate::catalog::{Catalog, Chapter};
use crate::generator::generate_for_selection;
use crate::range::{select_range, RangeError, RangeSelection};
use crate::types::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerStep {
    StartChapter,
    StartSection,
    EndChapter,
    EndSection,
    Ready,
}

impl PickerStep {
    pub fn prompt(&self) -> &'static str {
        match self {
            PickerStep::StartChapter => "試験範囲はどこからですか。まずは章を選びましょう",
            PickerStep::StartSection => "どの項目からですか？",
            PickerStep::EndChapter => "試験範囲はどこまでですか。章を選びましょう",
            PickerStep::EndSection => "どの項目までですか？",
            PickerStep::Ready => "試験範囲を決定",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerError {
    #[error("'{0}' is not one of the current choices")]
    NotACandidate(String),

    #[error("all four picks are needed before confirming")]
    Incomplete,

    #[error("nothing left to pick")]
    AlreadyComplete,

    #[error(transparent)]
    Range(#[from] RangeError),
}

/// One selectable option: the key to pass to [`RangePicker::choose`] and a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: &'static str,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct RangePicker<'a> {
    catalog: &'a Catalog,
    start_chapter: Option<&'a Chapter>,
    start_section: Option<usize>,
    end_chapter: Option<&'a Chapter>,
    end_section: Option<usize>,
}

impl<'a> RangePicker<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            start_chapter: None,
            start_section: None,
            end_chapter: None,
            end_section: None,
        }
    }

    pub fn step(&self) -> PickerStep {
        match (
            self.start_chapter,
            self.start_section,
            self.end_chapter,
            self.end_section,
        ) {
            (None, _, _, _) => PickerStep::StartChapter,
            (Some(_), None, _, _) => PickerStep::StartSection,
            (Some(_), Some(_), None, _) => PickerStep::EndChapter,
            (Some(_), Some(_), Some(_), None) => PickerStep::EndSection,
            _ => PickerStep::Ready,
        }
    }

    /// Choices valid at the current step
    pub fn candidates(&self) -> Vec<Candidate> {
        match self.step() {
            PickerStep::StartChapter => self.chapter_candidates(0),
            PickerStep::StartSection => self
                .start_chapter
                .map(|c| section_candidates(c, 0))
                .unwrap_or_default(),
            PickerStep::EndChapter => self.chapter_candidates(self.start_chapter_index()),
            PickerStep::EndSection => match self.end_chapter {
                Some(end) => {
                    // Same chapter: nothing before the start section
                    let from = if Some(end.label) == self.start_chapter.map(|c| c.label) {
                        self.start_section.unwrap_or(0)
                    } else {
                        0
                    };
                    section_candidates(end, from)
                }
                None => Vec::new(),
            },
            PickerStep::Ready => Vec::new(),
        }
    }

    /// Pick one of the current candidates by value
    pub fn choose(&mut self, value: &str) -> Result<PickerStep, PickerError> {
        let step = self.step();
        if step == PickerStep::Ready {
            return Err(PickerError::AlreadyComplete);
        }
        if !self.candidates().iter().any(|c| c.value == value) {
            return Err(PickerError::NotACandidate(value.to_string()));
        }

        match step {
            PickerStep::StartChapter => self.start_chapter = self.catalog.chapter(value),
            PickerStep::StartSection => {
                self.start_section = self.start_chapter.and_then(|c| c.section_index(value))
            }
            PickerStep::EndChapter => self.end_chapter = self.catalog.chapter(value),
            PickerStep::EndSection => {
                self.end_section = self.end_chapter.and_then(|c| c.section_index(value))
            }
            PickerStep::Ready => {}
        }

        Ok(self.step())
    }

    /// Undo the latest pick. Returns false when there was nothing to undo.
    pub fn back(&mut self) -> bool {
        match self.step() {
            PickerStep::StartChapter => return false,
            PickerStep::StartSection => self.start_chapter = None,
            PickerStep::EndChapter => self.start_section = None,
            PickerStep::EndSection => self.end_chapter = None,
            PickerStep::Ready => self.end_section = None,
        }
        true
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.catalog);
    }

    /// Validate the picks and generate the tasks for them
    pub fn finish(&self) -> Result<(RangeSelection, Vec<Task>), PickerError> {
        let (Some(sc), Some(ss), Some(ec), Some(es)) = (
            self.start_chapter,
            self.start_section,
            self.end_chapter,
            self.end_section,
        ) else {
            return Err(PickerError::Incomplete);
        };

        let selection = select_range(
            self.catalog,
            sc.label,
            sc.sections[ss].title,
            ec.label,
            ec.sections[es].title,
        )?;
        let tasks = generate_for_selection(self.catalog, &selection)?;
        Ok((selection, tasks))
    }

    fn start_chapter_index(&self) -> usize {
        self.start_chapter
            .and_then(|c| self.catalog.chapters.iter().position(|x| x.label == c.label))
            .unwrap_or(0)
    }

    fn chapter_candidates(&self, from: usize) -> Vec<Candidate> {
        self.catalog
            .chapters
            .iter()
            .skip(from)
            .map(|c| Candidate {
                value: c.label,
                label: c.title.to_string(),
            })
            .collect()
    }
}

fn section_candidates(chapter: &Chapter, from: usize) -> Vec<Candidate> {
    chapter
        .sections
        .iter()
        .skip(from)
        .map(|s| Candidate {
            value: s.title,
            label: format!("{}（問題{}）", s.title, s.problems),
        })
        .collect()
}
