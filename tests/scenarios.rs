//! Reference scenarios for the rule engine, gate, parser and auditor.

mod common;

use common::{AgreeingExplainer, FixedExplainer, TEMPLATE};

use trajsafe::consistency_check::{check_report, AuditIssue};
use trajsafe::explanation::{parse_explanation, Explanation};
use trajsafe::features::FeatureRecord;
use trajsafe::gate::ExplanationGate;
use trajsafe::report::Report;
use trajsafe::rules::{rule_risk_label, RiskLabel, RuleId};

fn features(d_t: f64, progress: f64, omega_max: f64, domega_max: f64, heading_err_abs: f64) -> FeatureRecord {
    FeatureRecord {
        goal_x: 0.0,
        goal_y: 0.0,
        d0: d_t + progress,
        d_t,
        dmin: d_t,
        progress,
        heading_err_abs,
        v_max: 0.5,
        omega_max,
        omega_mean: omega_max / 3.0,
        domega_max,
        sample_count: 20,
    }
}

fn scenario_b() -> FeatureRecord {
    features(1.0, 0.05, 2.5, 2.0, 1.2)
}

#[test]
fn scenario_a_safe_run_is_not_explained_and_audits_clean() {
    let f = features(0.2, 0.5, 1.0, 0.5, 0.2);
    let risk = rule_risk_label(&f);
    assert_eq!(risk.score, 0);
    assert_eq!(risk.label, RiskLabel::Safe);
    assert_eq!(risk.rules, vec![RuleId::CloseToGoal, RuleId::HasProgress]);

    let explainer = AgreeingExplainer::new();
    let explanation = ExplanationGate::new(TEMPLATE, &explainer)
        .explain(&f, &risk)
        .unwrap();
    assert!(explanation.is_none());
    assert_eq!(explainer.calls.get(), 0);

    let audit = check_report(&Report::new(1, f, risk, explanation));
    assert!(audit.is_ok());
}

#[test]
fn scenario_b_every_penalty_stacks() {
    let risk = rule_risk_label(&scenario_b());
    assert_eq!(risk.score, 8);
    assert_eq!(risk.label, RiskLabel::Unsafe);
    let ids: Vec<&str> = risk.rules.iter().map(|r| r.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "far_from_goal_end",
            "low_progress",
            "omega_too_high",
            "high_omega_jumps",
            "bad_heading_far_from_goal",
        ]
    );
}

#[test]
fn scenario_c_each_uncited_reason_is_flagged() {
    let f = scenario_b();
    let risk = rule_risk_label(&f);
    let explanation = Explanation {
        label: "UNSAFE".to_string(),
        confidence: "high".to_string(),
        reasons: vec![
            "The robot turned too fast.".to_string(),
            "It never got close to the goal.".to_string(),
        ],
        raw: None,
    };

    let audit = check_report(&Report::new(9, f, risk, Some(explanation)));
    assert_eq!(
        audit.issues,
        vec![
            AuditIssue::UnlinkedReason {
                reason: "The robot turned too fast.".to_string()
            },
            AuditIssue::UnlinkedReason {
                reason: "It never got close to the goal.".to_string()
            },
        ]
    );
}

#[test]
fn scenario_d_unstructured_reply_yields_label_mismatch() {
    let f = scenario_b();
    let risk = rule_risk_label(&f);

    let explainer = FixedExplainer("Sorry, I cannot produce JSON today.");
    let explanation = ExplanationGate::new(TEMPLATE, &explainer)
        .explain(&f, &risk)
        .unwrap()
        .unwrap();
    assert_eq!(explanation, Explanation::fallback("Sorry, I cannot produce JSON today."));
    assert_eq!(explanation.label, "UNCERTAIN");

    let audit = check_report(&Report::new(4, f, risk, Some(explanation)));
    assert_eq!(
        audit.issues[0].to_string(),
        "Label mismatch: rule=UNSAFE llm=UNCERTAIN"
    );
}

#[test]
fn agreeing_explanations_pass_the_audit() {
    let f = scenario_b();
    let risk = rule_risk_label(&f);
    let explainer = AgreeingExplainer::new();
    let explanation = ExplanationGate::new(TEMPLATE, &explainer)
        .explain(&f, &risk)
        .unwrap();
    assert_eq!(explainer.calls.get(), 1);

    let audit = check_report(&Report::new(2, f, risk, explanation));
    assert!(audit.is_ok(), "unexpected issues: {:?}", audit.issues);
}

#[test]
fn parser_never_fails() {
    for text in ["", "   ", "null", "{}", "{\"label\":1}", "not json at all", "```json\n{}\n```"] {
        let exp = parse_explanation(text);
        assert!(exp.is_fallback());
        assert_eq!(exp.raw.as_deref(), Some(text));
    }
}
