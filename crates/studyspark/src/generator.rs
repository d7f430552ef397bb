//! Test-range task generation.
//!
//! Walks the catalog in book order from the start section through the end
//! section (both inclusive) and emits one [`Task`] per problem number. The
//! output is the flattening of (section order x ascending problem number).

use tracing::debug;

use crate::catalog::Catalog;
use crate::range::{check_order, RangeEndpoint, RangeError, RangeSelection};
use crate::types::Task;

/// Generate the task list for a range.
///
/// Both endpoints are re-validated here: an unknown pair fails with
/// [`RangeError::EndpointNotFound`], an end before the start fails with
/// [`RangeError::InvalidRange`]. No tasks are produced on error.
pub fn generate_tasks(
    catalog: &Catalog,
    start: &RangeEndpoint,
    end: &RangeEndpoint,
) -> Result<Vec<Task>, RangeError> {
    let (start_pos, end_pos) = check_order(catalog, start, end)?;

    let tasks: Vec<Task> = catalog
        .linearize()
        .skip_while(|(_, _, pos)| *pos < start_pos)
        .take_while(|(_, _, pos)| *pos <= end_pos)
        .flat_map(|(chapter, section, _)| {
            section
                .problems
                .iter()
                .map(move |problem| Task::new(chapter.label, section.title, problem))
        })
        .collect();

    debug!(
        count = tasks.len(),
        start = %start,
        end = %end,
        "Generated tasks"
    );

    Ok(tasks)
}

/// Generate tasks for an already validated selection
pub fn generate_for_selection(
    catalog: &Catalog,
    selection: &RangeSelection,
) -> Result<Vec<Task>, RangeError> {
    generate_tasks(catalog, &selection.start, &selection.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Chapter, ProblemRange, Section, ALGEBRA_1};
    use crate::types::TaskStatus;

    fn ep(chapter: &str, section: &str) -> RangeEndpoint {
        RangeEndpoint::new(chapter, section)
    }

    fn section_len(chapter: &str, section: &str) -> usize {
        ALGEBRA_1
            .chapter(chapter)
            .and_then(|c| c.section(section))
            .map(|s| s.problems.len())
            .unwrap()
    }

    // ========== Concrete ranges ==========

    #[test]
    fn test_first_two_sections() {
        let tasks = generate_tasks(
            &ALGEBRA_1,
            &ep("第1章", "① 正の数と負の数"),
            &ep("第1章", "② 加法と減法"),
        )
        .unwrap();

        assert_eq!(tasks.len(), 29);
        let problems: Vec<u32> = tasks.iter().map(|t| t.problem).collect();
        assert_eq!(problems, (1..=29).collect::<Vec<_>>());
        assert!(tasks[..14].iter().all(|t| t.section == "① 正の数と負の数"));
        assert!(tasks[14..].iter().all(|t| t.section == "② 加法と減法"));
    }

    #[test]
    fn test_across_chapter_boundary() {
        let tasks = generate_tasks(&ALGEBRA_1, &ep("第1章", "章末問題"), &ep("第2章", "① 文字式")).unwrap();

        assert_eq!(tasks.len(), 18);

        let (review, next) = tasks.split_at(5);
        assert!(review.iter().all(|t| t.chapter == "第1章" && t.section == "章末問題"));
        assert_eq!(review.iter().map(|t| t.problem).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert!(next.iter().all(|t| t.chapter == "第2章" && t.section == "① 文字式"));
        assert_eq!(next.iter().map(|t| t.problem).collect::<Vec<_>>(), (1..=13).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_section() {
        let tasks = generate_tasks(
            &ALGEBRA_1,
            &ep("第5章", "⑦ 1次関数の利用"),
            &ep("第5章", "⑦ 1次関数の利用"),
        )
        .unwrap();

        assert_eq!(tasks.len(), 92 - 73 + 1);
        assert_eq!(tasks.first().unwrap().problem, 73);
        assert_eq!(tasks.last().unwrap().problem, 92);
        assert!(tasks.iter().all(|t| t.chapter == "第5章" && t.section == "⑦ 1次関数の利用"));
    }

    #[test]
    fn test_single_section_never_whole_catalog() {
        for (chapter, section, _) in ALGEBRA_1.linearize() {
            let endpoint = ep(chapter.label, section.title);
            let tasks = generate_tasks(&ALGEBRA_1, &endpoint, &endpoint).unwrap();
            assert_eq!(tasks.len(), section.problems.len());
        }
    }

    #[test]
    fn test_whole_book() {
        let tasks = generate_tasks(
            &ALGEBRA_1,
            &ep("第1章", "① 正の数と負の数"),
            &ep("第5章", "章末問題"),
        )
        .unwrap();
        assert_eq!(tasks.len(), ALGEBRA_1.problem_count());
    }

    #[test]
    fn test_count_is_sum_of_sections() {
        let tasks = generate_tasks(
            &ALGEBRA_1,
            &ep("第3章", "⑤ 連立方程式の利用"),
            &ep("第4章", "③ 不等式の利用"),
        )
        .unwrap();

        let expected = section_len("第3章", "⑤ 連立方程式の利用")
            + section_len("第3章", "章末問題")
            + section_len("第4章", "① 不等式の性質 / ② 不等式の解き方")
            + section_len("第4章", "③ 不等式の利用");
        assert_eq!(tasks.len(), expected);
        assert_eq!(expected, 14 + 6 + 18 + 15);
    }

    // ========== Invariants ==========

    #[test]
    fn test_all_tasks_unset() {
        let tasks = generate_tasks(&ALGEBRA_1, &ep("第2章", "① 文字式"), &ep("第2章", "章末問題")).unwrap();
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Unset && t.updated_at.is_none()));
    }

    #[test]
    fn test_regeneration_is_idempotent() {
        let start = ep("第1章", "④ 四則の混じった計算");
        let end = ep("第3章", "③ 1次方程式の利用");

        let first: Vec<String> = generate_tasks(&ALGEBRA_1, &start, &end)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        let second: Vec<String> = generate_tasks(&ALGEBRA_1, &start, &end)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_ids_unique() {
        let tasks = generate_tasks(
            &ALGEBRA_1,
            &ep("第1章", "① 正の数と負の数"),
            &ep("第5章", "章末問題"),
        )
        .unwrap();

        let ids: std::collections::HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), tasks.len());
    }

    #[test]
    fn test_output_in_book_order() {
        let tasks = generate_tasks(&ALGEBRA_1, &ep("第1章", "③ 乗法と除法"), &ep("第4章", "④ 連立不等式")).unwrap();

        for pair in tasks.windows(2) {
            let a = ALGEBRA_1.position(&pair[0].chapter, &pair[0].section).unwrap();
            let b = ALGEBRA_1.position(&pair[1].chapter, &pair[1].section).unwrap();
            assert!(a < b || (a == b && pair[0].problem < pair[1].problem));
        }
    }

    // ========== Errors ==========

    #[test]
    fn test_reversed_range_fails() {
        let result = generate_tasks(&ALGEBRA_1, &ep("第2章", "① 文字式"), &ep("第1章", "章末問題"));
        assert!(matches!(result, Err(RangeError::InvalidRange { .. })));
    }

    #[test]
    fn test_reversed_within_chapter_fails() {
        let result = generate_tasks(&ALGEBRA_1, &ep("第1章", "② 加法と減法"), &ep("第1章", "① 正の数と負の数"));
        assert!(matches!(result, Err(RangeError::InvalidRange { .. })));
    }

    #[test]
    fn test_unknown_chapter_fails() {
        let result = generate_tasks(&ALGEBRA_1, &ep("第7章", "章末問題"), &ep("第1章", "章末問題"));
        assert!(matches!(result, Err(RangeError::EndpointNotFound { .. })));

        let result = generate_tasks(&ALGEBRA_1, &ep("第1章", "章末問題"), &ep("第7章", "章末問題"));
        assert!(matches!(result, Err(RangeError::EndpointNotFound { .. })));
    }

    #[test]
    fn test_unknown_section_fails() {
        let result = generate_tasks(&ALGEBRA_1, &ep("第1章", "⑨"), &ep("第1章", "章末問題"));
        assert_eq!(
            result,
            Err(RangeError::EndpointNotFound {
                chapter: "第1章".to_string(),
                section: "⑨".to_string(),
            })
        );
    }

    // ========== Custom catalogs ==========

    static TINY: Catalog = Catalog {
        name: "tiny",
        available: true,
        chapters: &[
            Chapter {
                label: "A",
                title: "A intro",
                sections: &[Section {
                    title: "a1",
                    problems: ProblemRange { first: 7, last: 7 },
                }],
            },
            Chapter {
                label: "B",
                title: "B more",
                sections: &[
                    Section {
                        title: "b1",
                        problems: ProblemRange { first: 1, last: 2 },
                    },
                    Section {
                        title: "b2",
                        problems: ProblemRange { first: 3, last: 4 },
                    },
                ],
            },
        ],
    };

    #[test]
    fn test_custom_catalog() {
        let tasks = generate_tasks(&TINY, &ep("A", "a1"), &ep("B", "b1")).unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["A-a1-7", "B-b1-1", "B-b1-2"]);
    }

    #[test]
    fn test_generate_for_selection() {
        let selection = crate::range::select_range(&TINY, "B", "b1", "B", "b2").unwrap();
        let tasks = generate_for_selection(&TINY, &selection).unwrap();
        assert_eq!(tasks.iter().map(|t| t.problem).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    static DASHED: Catalog = Catalog {
        name: "dashed",
        available: true,
        chapters: &[
            Chapter {
                label: "A-b",
                title: "A-b",
                sections: &[Section {
                    title: "c",
                    problems: ProblemRange { first: 1, last: 1 },
                }],
            },
            Chapter {
                label: "A",
                title: "A",
                sections: &[Section {
                    title: "b-c",
                    problems: ProblemRange { first: 1, last: 1 },
                }],
            },
        ],
    };

    #[test]
    fn test_ids_unique_with_dashed_labels() {
        let tasks = generate_tasks(&DASHED, &ep("A-b", "c"), &ep("A", "b-c")).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_ne!(tasks[0].id, tasks[1].id);
    }
}
