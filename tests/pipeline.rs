use math_mentor::agent::MathMentor;
use math_mentor::config::PipelineConfig;
use math_mentor::memory::{JsonFileMemoryStore, MemoryStore};
use math_mentor::models::{
    Feedback, InputType, OriginalInput, PipelineOutcome, ReviewStage, Route, Submission, Topic,
    UserFeedback, Verdict,
};
use math_mentor::retrieval::{KnowledgeBaseRetriever, NoopRetriever, Retriever};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

async fn mentor_in(dir: &TempDir, retriever: Arc<dyn Retriever>) -> MathMentor {
    let config = PipelineConfig {
        memory_path: dir.path().join("memory.json"),
        ..PipelineConfig::default()
    };
    let memory = JsonFileMemoryStore::open(&config.memory_path).await.unwrap();
    MathMentor::new(&config, Arc::new(memory), retriever)
}

fn extracted(input_type: InputType, text: &str, confidence: f64) -> Submission {
    Submission {
        input_type,
        original_input: OriginalInput::Text(text.to_string()),
        extracted_text: text.to_string(),
        confidence,
        user_confirmed: true,
        reuse_previous: false,
    }
}

#[tokio::test]
async fn solves_and_remembers_a_quadratic_equation() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    let report = mentor
        .run(Submission::text("Solve x^2 - 4 = 0", true))
        .await
        .unwrap();

    match report.outcome {
        PipelineOutcome::Solved {
            problem,
            route,
            solution,
            verification,
            similar,
        } => {
            assert_eq!(problem.topic, Topic::Algebra);
            assert_eq!(route, Route::QuadraticEquation);
            assert_eq!(solution.final_answer, "x = -2, 2");
            assert!(verification.is_valid);
            assert!(similar.is_none());
        }
        other => panic!("expected a solved outcome, got {:?}", other),
    }

    let reopened = JsonFileMemoryStore::open(dir.path().join("memory.json"))
        .await
        .unwrap();
    let found = reopened.find_similar("Solve x^2 - 4 = 0").await.unwrap().unwrap();
    assert_eq!(found.final_answer, "x = -2, 2");
    assert!(found.verified);
    assert_eq!(found.user_feedback, UserFeedback::Unknown);
}

#[tokio::test]
async fn hedge_word_stops_before_routing() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    let report = mentor
        .run(Submission::text("f(x) = x^2 + 2x + something", true))
        .await
        .unwrap();

    match report.outcome {
        PipelineOutcome::NeedsHuman { review } => {
            assert_eq!(review.stage, ReviewStage::Parser);
            assert!(review.reason.contains("something"));
        }
        other => panic!("expected human review, got {:?}", other),
    }
    assert!(report.trace.iter().all(|line| !line.starts_with("ROUTE")));
}

#[tokio::test]
async fn low_confidence_scan_needs_review() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    let report = mentor
        .run(extracted(InputType::Image, "x^2 - 5x + 6 = 0", 0.7499))
        .await
        .unwrap();
    assert_eq!(report.outcome.kind(), "needs_human");

    let report = mentor
        .run(extracted(InputType::Image, "x^2 - 5x + 6 = 0", 0.75))
        .await
        .unwrap();
    match report.outcome {
        PipelineOutcome::Solved { solution, .. } => {
            assert_eq!(solution.final_answer, "x = 2, 3");
        }
        other => panic!("expected a solved outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn invalid_confidence_is_an_error() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    let result = mentor.run(extracted(InputType::Audio, "x + 1 = 3", 1.5)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn optimization_routes_ahead_of_equations() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    let report = mentor
        .run(Submission::text(
            "find the maximum of f(x) = -x^2 + 4, given that f(x) = 5",
            true,
        ))
        .await
        .unwrap();

    match report.outcome {
        PipelineOutcome::Solved {
            route, solution, ..
        } => {
            assert_eq!(route, Route::QuadraticOptimization);
            // a bare extremum value does not name the extremum kind
            assert_eq!(
                solution.final_answer,
                "The computed result does not match the expected answer type for this problem."
            );
            assert!(solution
                .steps
                .iter()
                .any(|s| s == "Value at the critical point: 4"));
        }
        other => panic!("expected a solved outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn target_extremum_solves_for_the_parameter() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    let report = mentor
        .run(Submission::text("f(x) = x^2 + kx + 5, minimum value = 1", true))
        .await
        .unwrap();

    match report.outcome {
        PipelineOutcome::Solved {
            route, solution, ..
        } => {
            assert_eq!(route, Route::QuadraticOptimization);
            assert_eq!(solution.final_answer, "k = -4");
            assert!(solution.error.is_none());
        }
        other => panic!("expected a solved outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn computation_failure_is_rejected_and_not_saved() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    let report = mentor
        .run(Submission::text("Factor sin(x) + x", true))
        .await
        .unwrap();

    match report.outcome {
        PipelineOutcome::Rejected {
            solution,
            verification,
            ..
        } => {
            assert_eq!(solution.final_answer, "Could not analyze the expression.");
            assert_eq!(
                verification.reason.as_deref(),
                Some("Solver failed to compute solution.")
            );
        }
        other => panic!("expected a rejected outcome, got {:?}", other),
    }
    assert!(mentor.memory().records().await.unwrap().is_empty());
}

#[tokio::test]
async fn wrong_answer_shape_is_returned_and_saved() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    // no real roots: the answer lacks "x =" and fails validation
    let report = mentor
        .run(Submission::text("Solve x^2 + 1 = 0", true))
        .await
        .unwrap();

    match report.outcome {
        PipelineOutcome::Solved { solution, .. } => {
            assert_eq!(
                solution.final_answer,
                "The computed result does not match the expected answer type for this problem."
            );
            assert_eq!(solution.error.as_deref(), Some("Answer-type validation failed"));
            assert!(!solution.steps.is_empty());
        }
        other => panic!("expected a solved outcome, got {:?}", other),
    }
    let records = mentor.memory().records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].verified);
}

#[tokio::test]
async fn equation_parse_failure_becomes_a_mismatch() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    let report = mentor
        .run(Submission::text("Solve sin(x) + 1 = 0 for x", true))
        .await
        .unwrap();

    match report.outcome {
        PipelineOutcome::Solved { solution, .. } => {
            assert_eq!(solution.error.as_deref(), Some("Answer-type validation failed"));
            assert_eq!(solution.steps.len(), 1);
        }
        other => panic!("expected a solved outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn similar_problem_is_recalled_on_request() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    mentor
        .run(Submission::text("Factor x^2 - 5x + 6", true))
        .await
        .unwrap();

    let mut again = Submission::text("Factor x^2 - 5x + 6", true);
    again.reuse_previous = true;
    let report = mentor.run(again).await.unwrap();

    match report.outcome {
        PipelineOutcome::Recalled { record, route, .. } => {
            assert_eq!(route, Route::ExpressionAnalysis);
            assert_eq!(record.final_answer, "Factored form: (x - 2)*(x - 3)");
        }
        other => panic!("expected a recalled outcome, got {:?}", other),
    }

    // without reuse the problem is solved again and the match is reported
    let report = mentor
        .run(Submission::text("Factor x^2 - 5x + 6", true))
        .await
        .unwrap();
    match report.outcome {
        PipelineOutcome::Solved { similar, .. } => assert!(similar.is_some()),
        other => panic!("expected a solved outcome, got {:?}", other),
    }
    assert_eq!(mentor.memory().records().await.unwrap().len(), 2);
}

#[tokio::test]
async fn retrieved_context_travels_with_the_solution() {
    let dir = tempdir().unwrap();
    let retriever = KnowledgeBaseRetriever::new(vec![
        "Difference of squares: a^2 - b^2 = (a - b)(a + b)".to_string(),
        "Probability of two dice".to_string(),
    ]);
    let mentor = mentor_in(&dir, Arc::new(retriever)).await;

    let report = mentor
        .run(Submission::text("Solve x^2 - 4 = 0", true))
        .await
        .unwrap();

    match report.outcome {
        PipelineOutcome::Solved { solution, .. } => {
            assert_eq!(solution.final_answer, "x = -2, 2");
            assert_eq!(solution.used_context.len(), 1);
            assert!(solution.used_context[0].starts_with("Difference of squares"));
        }
        other => panic!("expected a solved outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn feedback_appends_records() {
    let dir = tempdir().unwrap();
    let mentor = mentor_in(&dir, Arc::new(NoopRetriever)).await;

    let correct = mentor
        .record_feedback(Feedback {
            problem_text: "x^2 - 4 = 0".to_string(),
            route: Route::QuadraticEquation,
            final_answer: "x = -2, 2".to_string(),
            steps: vec![],
            verdict: Verdict::Correct,
        })
        .await
        .unwrap();
    assert!(correct.verified);
    assert_eq!(correct.user_feedback, UserFeedback::Correct);

    let incorrect = mentor
        .record_feedback(Feedback {
            problem_text: "x^2 - 9 = 0".to_string(),
            route: Route::QuadraticEquation,
            final_answer: "x = 3".to_string(),
            steps: vec![],
            verdict: Verdict::Incorrect {
                correction: "x = -3, 3".to_string(),
            },
        })
        .await
        .unwrap();
    assert!(!incorrect.verified);
    assert_eq!(incorrect.correction.as_deref(), Some("x = -3, 3"));

    let records = mentor.memory().records().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].user_feedback, UserFeedback::Incorrect);
}
