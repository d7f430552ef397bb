//! Problem-book catalogs.
//!
//! A catalog is a closed, build-time table: chapters in book order, each with
//! its sections in book order, each section owning an inclusive range of
//! problem numbers. Nothing here is mutable.

use serde::Serialize;

/// Inclusive range of problem numbers, `first <= last`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProblemRange {
    pub first: u32,
    pub last: u32,
}

impl ProblemRange {
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub fn len(&self) -> usize {
        (self.last - self.first + 1) as usize
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<u32> {
        self.first..=self.last
    }
}

impl std::fmt::Display for ProblemRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub problems: ProblemRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chapter {
    /// Stable label used as the chapter key (e.g., "第1章")
    pub label: &'static str,
    /// Full display title (e.g., "第1章 正の数と負の数")
    pub title: &'static str,
    pub sections: &'static [Section],
}

impl Chapter {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn section_index(&self, title: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.title == title)
    }
}

/// Linear position of a section within a catalog.
/// Ordering is lexicographic on (chapter, section), which is book order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub chapter: usize,
    pub section: usize,
}

/// A problem book and its chapter table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub name: &'static str,
    /// Books listed in the app but without a chapter table yet
    pub available: bool,
    pub chapters: &'static [Chapter],
}

impl Catalog {
    pub fn chapter(&self, label: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.label == label)
    }

    /// Position of a (chapter, section) pair, `None` if either is unknown
    pub fn position(&self, chapter: &str, section: &str) -> Option<Position> {
        let chapter_idx = self.chapters.iter().position(|c| c.label == chapter)?;
        let section_idx = self.chapters[chapter_idx].section_index(section)?;
        Some(Position {
            chapter: chapter_idx,
            section: section_idx,
        })
    }

    /// Every section of the book in book order
    pub fn linearize(&self) -> impl Iterator<Item = (&Chapter, &Section, Position)> + '_ {
        self.chapters
            .iter()
            .enumerate()
            .flat_map(|(ci, chapter)| {
                chapter.sections.iter().enumerate().map(move |(si, section)| {
                    (
                        chapter,
                        section,
                        Position {
                            chapter: ci,
                            section: si,
                        },
                    )
                })
            })
    }

    pub fn section_count(&self) -> usize {
        self.chapters.iter().map(|c| c.sections.len()).sum()
    }

    pub fn problem_count(&self) -> usize {
        self.linearize().map(|(_, s, _)| s.problems.len()).sum()
    }
}

const fn section(title: &'static str, first: u32, last: u32) -> Section {
    Section {
        title,
        problems: ProblemRange::new(first, last),
    }
}

pub const ALGEBRA_1_NAME: &str = "体系問題集 数学１代数編";

pub static ALGEBRA_1: Catalog = Catalog {
    name: ALGEBRA_1_NAME,
    available: true,
    chapters: &[
        Chapter {
            label: "第1章",
            title: "第1章 正の数と負の数",
            sections: &[
                section("① 正の数と負の数", 1, 14),
                section("② 加法と減法", 15, 29),
                section("③ 乗法と除法", 30, 44),
                section("④ 四則の混じった計算", 45, 61),
                section("章末問題", 1, 5),
            ],
        },
        Chapter {
            label: "第2章",
            title: "第2章 式の計算",
            sections: &[
                section("① 文字式", 1, 13),
                section("② 多項式の計算", 14, 33),
                section("③ 単項式の乗法と除法", 34, 41),
                section("④ 文字式の利用", 42, 49),
                section("章末問題", 1, 5),
            ],
        },
        Chapter {
            label: "第3章",
            title: "第3章 方程式",
            sections: &[
                section("① 方程式とその解 / ② １次方程式の解き方", 1, 14),
                section("③ 1次方程式の利用", 15, 36),
                section("④ 連立方程式", 37, 49),
                section("⑤ 連立方程式の利用", 50, 63),
                section("章末問題", 1, 6),
            ],
        },
        Chapter {
            label: "第4章",
            title: "第4章 不等式",
            sections: &[
                section("① 不等式の性質 / ② 不等式の解き方", 1, 18),
                section("③ 不等式の利用", 19, 33),
                section("④ 連立不等式", 34, 51),
                section("章末問題", 1, 6),
            ],
        },
        Chapter {
            label: "第5章",
            title: "第5章 1次関数",
            sections: &[
                section("① 変化と関数", 1, 2),
                section("② 比例とそのグラフ", 3, 20),
                section("③ 反比例とそのグラフ", 21, 33),
                section("④ 比例,反比例の利用", 34, 38),
                section("⑤ 1次関数とそのグラフ", 39, 63),
                section("⑥ 1次関数と方程式", 64, 72),
                section("⑦ 1次関数の利用", 73, 92),
                section("章末問題", 1, 5),
            ],
        },
    ],
};

/// Every book offered in the app, in display order
pub static BOOKS: [&Catalog; 4] = [
    &ALGEBRA_1,
    &Catalog {
        name: "体系問題集 数学１幾何編",
        available: false,
        chapters: &[],
    },
    &Catalog {
        name: "体系問題集 数学２代数編",
        available: false,
        chapters: &[],
    },
    &Catalog {
        name: "体系問題集 数学２幾何編",
        available: false,
        chapters: &[],
    },
];

pub fn find_book(name: &str) -> Option<&'static Catalog> {
    BOOKS.iter().copied().find(|b| b.name == name)
}

/// Subjects shown on the Spark start screen. Only math has books so far.
pub const SUBJECTS: &[&str] = &["英語", "数学", "国語", "理科", "社会"];
pub const DEFAULT_SUBJECT: &str = "数学";

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Table shape ==========

    #[test]
    fn test_algebra_chapters_in_order() {
        let labels: Vec<_> = ALGEBRA_1.chapters.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["第1章", "第2章", "第3章", "第4章", "第5章"]);
    }

    #[test]
    fn test_chapter_titles_start_with_label() {
        for chapter in ALGEBRA_1.chapters {
            assert!(chapter.title.starts_with(chapter.label), "{}", chapter.title);
        }
    }

    #[test]
    fn test_problem_ranges_valid() {
        for (_, section, _) in ALGEBRA_1.linearize() {
            assert!(section.problems.first >= 1);
            assert!(section.problems.first <= section.problems.last);
        }
    }

    #[test]
    fn test_section_titles_unique_within_chapter() {
        for chapter in ALGEBRA_1.chapters {
            for (i, s) in chapter.sections.iter().enumerate() {
                assert_eq!(chapter.section_index(s.title), Some(i));
            }
        }
    }

    #[test]
    fn test_counts() {
        assert_eq!(ALGEBRA_1.section_count(), 27);
        // 61+5 + 49+5 + 63+6 + 51+6 + 92+5
        assert_eq!(ALGEBRA_1.problem_count(), 343);
    }

    // ========== Lookup ==========

    #[test]
    fn test_chapter_lookup() {
        let chapter = ALGEBRA_1.chapter("第2章").unwrap();
        assert_eq!(chapter.title, "第2章 式の計算");
        assert!(ALGEBRA_1.chapter("第9章").is_none());
        // Full titles are not labels
        assert!(ALGEBRA_1.chapter("第2章 式の計算").is_none());
    }

    #[test]
    fn test_section_lookup() {
        let chapter = ALGEBRA_1.chapter("第1章").unwrap();
        let section = chapter.section("② 加法と減法").unwrap();
        assert_eq!(section.problems, ProblemRange::new(15, 29));
        assert!(chapter.section("② 多項式の計算").is_none());
    }

    #[test]
    fn test_position_ordering() {
        let a = ALGEBRA_1.position("第1章", "章末問題").unwrap();
        let b = ALGEBRA_1.position("第2章", "① 文字式").unwrap();
        let c = ALGEBRA_1.position("第2章", "章末問題").unwrap();

        assert_eq!(a, Position { chapter: 0, section: 4 });
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_position_unknown() {
        assert!(ALGEBRA_1.position("第6章", "章末問題").is_none());
        assert!(ALGEBRA_1.position("第1章", "⑤ 存在しない").is_none());
    }

    #[test]
    fn test_linearize_matches_positions() {
        let mut previous: Option<Position> = None;
        for (chapter, section, pos) in ALGEBRA_1.linearize() {
            assert_eq!(ALGEBRA_1.position(chapter.label, section.title), Some(pos));
            if let Some(prev) = previous {
                assert!(prev < pos);
            }
            previous = Some(pos);
        }
    }

    #[test]
    fn test_problem_range_len_and_display() {
        let range = ProblemRange::new(73, 92);
        assert_eq!(range.len(), 20);
        assert_eq!(range.to_string(), "73-92");
        assert_eq!(range.iter().count(), 20);
        assert_eq!(ProblemRange::new(4, 4).len(), 1);
    }

    // ========== Books ==========

    #[test]
    fn test_find_book() {
        let book = find_book(ALGEBRA_1_NAME).unwrap();
        assert!(book.available);
        assert_eq!(book.chapters.len(), 5);

        let geometry = find_book("体系問題集 数学１幾何編").unwrap();
        assert!(!geometry.available);
        assert!(geometry.chapters.is_empty());

        assert!(find_book("unknown").is_none());
    }

    #[test]
    fn test_default_subject_listed() {
        assert!(SUBJECTS.contains(&DEFAULT_SUBJECT));
    }
}
