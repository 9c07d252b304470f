//! Built-in sample catalog for tests and demos.
//!
//! Two modules: design foundations (open from the start) and an HTML
//! module gated on it. The HTML lesson carries stage content so the full
//! explanation/exercise shape is exercised without external fixtures.

use crate::catalog::Catalog;
use crate::model::{Challenge, Lesson, Module, Status};
use crate::stage::{Solution, Stage};

/// Assemble the sample catalog.
///
/// Fresh value on every call; callers own it outright.
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        Module {
            id: "design-foundations".to_string(),
            title: "Design Foundations".to_string(),
            icon: Some("palette".to_string()),
            status: Status::Current,
            depends_on: None,
            lessons: vec![
                Lesson {
                    id: "color-contrast".to_string(),
                    title: "Color Contrast".to_string(),
                    path: "/design-foundations/color-contrast".to_string(),
                    icon: Some("check-circle".to_string()),
                    status: Status::Current,
                    challenges: vec![Challenge::new(
                        "challenge-1-text-for-given-bg",
                        "Choose a readable text color for the given background",
                    )],
                    stages: Vec::new(),
                },
                Lesson {
                    id: "alignment".to_string(),
                    title: "Alignment".to_string(),
                    path: "/design-foundations/alignment".to_string(),
                    icon: Some("align-left".to_string()),
                    status: Status::Locked,
                    challenges: vec![Challenge::new(
                        "align-left-all",
                        "Align every block to the left edge",
                    )],
                    stages: Vec::new(),
                },
            ],
        },
        Module {
            id: "html-css".to_string(),
            title: "HTML & CSS".to_string(),
            icon: Some("code".to_string()),
            status: Status::Locked,
            depends_on: Some("design-foundations".to_string()),
            lessons: vec![Lesson {
                id: "semantic-html".to_string(),
                title: "Semantic HTML".to_string(),
                path: "/html-css/semantic-html".to_string(),
                icon: Some("construction".to_string()),
                status: Status::Todo,
                challenges: Vec::new(),
                stages: semantic_html_stages(),
            }],
        },
    ])
}

fn semantic_html_stages() -> Vec<Stage> {
    vec![
        Stage::Explanation {
            id: "intro".to_string(),
            title: "What is HTML?".to_string(),
            content: "<p>HTML is the skeleton of every web page. Semantic HTML \
                      means using the right tag for the right job, which makes \
                      a site easier to understand for browsers, search engines, \
                      and screen readers.</p>"
                .to_string(),
        },
        Stage::Exercise {
            id: "headings".to_string(),
            title: "Headings".to_string(),
            instructions: "<p>Headings title the sections of a page, from \
                           <code>&lt;h1&gt;</code> down to <code>&lt;h6&gt;</code>. \
                           Change the <code>&lt;p&gt;</code> tag into an \
                           <code>&lt;h1&gt;</code> to give the page a main title.</p>"
                .to_string(),
            initial_code: "<p>My First Website</p>".to_string(),
            solution: Solution::Exact("<h1>My First Website</h1>".to_string()),
        },
        Stage::Exercise {
            id: "paragraphs".to_string(),
            title: "Paragraphs".to_string(),
            instructions: "<p>The <code>&lt;p&gt;</code> tag marks a paragraph. \
                           Add one below the heading that says \
                           \"Welcome to my site!\".</p>"
                .to_string(),
            initial_code: "<h1>My First Website</h1>".to_string(),
            solution: Solution::Pattern(
                r"(?s)^<h1>My First Website</h1>\s*<p>Welcome to my site!</p>$".to_string(),
            ),
        },
    ]
}
