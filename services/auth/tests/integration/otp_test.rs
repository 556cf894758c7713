use homerent_auth::domain::types::{EMAIL_CODE, OtpChannel, OtpIssuePolicy};
use homerent_auth::error::AuthServiceError;
use homerent_auth::usecase::otp::{SendEmailOtpUseCase, VerifyEmailOtpInput, VerifyEmailOtpUseCase};
use homerent_auth::usecase::token::registration_email;

use crate::helpers::{MockMailer, MockOtpRepo, TEST_JWT_SECRET, challenge_aged, lifecycle};

fn verify_usecase(repo: &MockOtpRepo) -> VerifyEmailOtpUseCase<MockOtpRepo> {
    VerifyEmailOtpUseCase {
        otp: lifecycle(repo, OtpIssuePolicy::ReplaceAlways),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

fn verify_input(email: &str, code: &str) -> VerifyEmailOtpInput {
    VerifyEmailOtpInput {
        email: email.to_owned(),
        code: code.to_owned(),
    }
}

// ── issue / verify lifecycle ─────────────────────────────────────────────────

#[tokio::test]
async fn should_verify_issued_code_exactly_once() {
    let repo = MockOtpRepo::empty();
    let otp = lifecycle(&repo, OtpIssuePolicy::ReplaceAlways);

    let issued = otp
        .issue(OtpChannel::Email, "a@x.com", None, EMAIL_CODE)
        .await
        .unwrap();
    assert!(issued.fresh);
    assert_eq!(issued.challenge.code.len(), 6);
    assert!(issued.challenge.code.bytes().all(|b| b.is_ascii_digit()));

    let consumed = otp
        .verify(OtpChannel::Email, "a@x.com", None, &issued.challenge.code)
        .await
        .unwrap();
    assert_eq!(consumed.subject, "a@x.com");

    let again = otp
        .verify(OtpChannel::Email, "a@x.com", None, &issued.challenge.code)
        .await;
    assert!(
        matches!(again, Err(AuthServiceError::OtpNotFound)),
        "expected OtpNotFound, got {again:?}"
    );
}

#[tokio::test]
async fn should_keep_challenge_after_wrong_code() {
    let repo = MockOtpRepo::new(vec![challenge_aged(
        OtpChannel::Email,
        "a@x.com",
        None,
        "123456",
        10,
    )]);
    let otp = lifecycle(&repo, OtpIssuePolicy::ReplaceAlways);

    let wrong = otp.verify(OtpChannel::Email, "a@x.com", None, "654321").await;
    assert!(matches!(wrong, Err(AuthServiceError::InvalidCode)));
    assert_eq!(repo.challenges_handle().lock().unwrap().len(), 1);

    otp.verify(OtpChannel::Email, "a@x.com", None, "123456")
        .await
        .unwrap();
    assert!(repo.challenges_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_compare_codes_case_sensitively() {
    let repo = MockOtpRepo::new(vec![challenge_aged(
        OtpChannel::Phone,
        "+65 81234567",
        None,
        "AB12C",
        10,
    )]);
    let otp = lifecycle(&repo, OtpIssuePolicy::ReplaceAlways);

    let result = otp.verify(OtpChannel::Phone, "+65 81234567", None, "ab12c").await;
    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_reject_correct_code_after_expiry() {
    let repo = MockOtpRepo::new(vec![challenge_aged(
        OtpChannel::Email,
        "a@x.com",
        None,
        "123456",
        301,
    )]);
    let otp = lifecycle(&repo, OtpIssuePolicy::ReplaceAlways);

    let result = otp.verify(OtpChannel::Email, "a@x.com", None, "123456").await;
    assert!(
        matches!(result, Err(AuthServiceError::CodeExpired)),
        "expected CodeExpired, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_mismatch_before_expiry() {
    let repo = MockOtpRepo::new(vec![challenge_aged(
        OtpChannel::Email,
        "a@x.com",
        None,
        "123456",
        600,
    )]);
    let otp = lifecycle(&repo, OtpIssuePolicy::ReplaceAlways);

    let result = otp.verify(OtpChannel::Email, "a@x.com", None, "000000").await;
    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_supersede_live_challenge_on_reissue() {
    let repo = MockOtpRepo::empty();
    let otp = lifecycle(&repo, OtpIssuePolicy::ReplaceAlways);

    let first = otp
        .issue(OtpChannel::Email, "a@x.com", None, EMAIL_CODE)
        .await
        .unwrap();
    let second = otp
        .issue(OtpChannel::Email, "a@x.com", None, EMAIL_CODE)
        .await
        .unwrap();
    assert!(second.fresh);
    assert_eq!(repo.challenges_handle().lock().unwrap().len(), 1);

    // Codes can collide by chance; only a differing old code proves anything.
    if first.challenge.code != second.challenge.code {
        let old = otp
            .verify(OtpChannel::Email, "a@x.com", None, &first.challenge.code)
            .await;
        assert!(matches!(old, Err(AuthServiceError::InvalidCode)));
    }
    otp.verify(OtpChannel::Email, "a@x.com", None, &second.challenge.code)
        .await
        .unwrap();
}

#[tokio::test]
async fn should_honor_only_most_recent_of_duplicate_challenges() {
    // Two concurrent issuances both landed.
    let repo = MockOtpRepo::new(vec![
        challenge_aged(OtpChannel::Email, "a@x.com", None, "111111", 20),
        challenge_aged(OtpChannel::Email, "a@x.com", None, "222222", 5),
    ]);
    let otp = lifecycle(&repo, OtpIssuePolicy::ReplaceAlways);

    let older = otp.verify(OtpChannel::Email, "a@x.com", None, "111111").await;
    assert!(matches!(older, Err(AuthServiceError::InvalidCode)));
    otp.verify(OtpChannel::Email, "a@x.com", None, "222222")
        .await
        .unwrap();
}

#[tokio::test]
async fn should_replace_expired_challenge_on_issue() {
    let repo = MockOtpRepo::new(vec![challenge_aged(
        OtpChannel::Email,
        "a@x.com",
        None,
        "123456",
        900,
    )]);
    let otp = lifecycle(&repo, OtpIssuePolicy::ReplaceIfStale);

    let issued = otp
        .issue(OtpChannel::Email, "a@x.com", None, EMAIL_CODE)
        .await
        .unwrap();
    assert!(issued.fresh);
    let challenges = repo.challenges_handle();
    let challenges = challenges.lock().unwrap();
    assert_eq!(challenges.len(), 1);
    assert_eq!(challenges[0].id, issued.challenge.id);
}

#[tokio::test]
async fn should_reuse_recent_challenge_under_replace_if_stale() {
    let existing = challenge_aged(OtpChannel::Email, "a@x.com", None, "123456", 10);
    let repo = MockOtpRepo::new(vec![existing.clone()]);
    let otp = lifecycle(&repo, OtpIssuePolicy::ReplaceIfStale);

    let issued = otp
        .issue(OtpChannel::Email, "a@x.com", None, EMAIL_CODE)
        .await
        .unwrap();
    assert!(!issued.fresh);
    assert_eq!(issued.challenge.id, existing.id);
}

#[tokio::test]
async fn should_replace_challenge_older_than_resend_interval_under_replace_if_stale() {
    let existing = challenge_aged(OtpChannel::Email, "a@x.com", None, "123456", 90);
    let repo = MockOtpRepo::new(vec![existing.clone()]);
    let otp = lifecycle(&repo, OtpIssuePolicy::ReplaceIfStale);

    let issued = otp
        .issue(OtpChannel::Email, "a@x.com", None, EMAIL_CODE)
        .await
        .unwrap();
    assert!(issued.fresh);
    assert_ne!(issued.challenge.id, existing.id);
}

// ── SendEmailOtpUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_mail_code_to_normalized_address() {
    let repo = MockOtpRepo::empty();
    let mailer = MockMailer::default();
    let sent = mailer.sent_handle();
    let usecase = SendEmailOtpUseCase {
        otp: lifecycle(&repo, OtpIssuePolicy::ReplaceAlways),
        mailer,
    };

    assert!(usecase.execute(" A@X.com ").await.unwrap());

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "a@x.com");
    let stored = repo.challenges_handle();
    let stored = stored.lock().unwrap();
    assert_eq!(stored[0].subject, "a@x.com");
    assert_eq!(stored[0].code, sent[0].1);
}

#[tokio::test]
async fn should_return_false_but_keep_challenge_when_mail_fails() {
    let repo = MockOtpRepo::empty();
    let usecase = SendEmailOtpUseCase {
        otp: lifecycle(&repo, OtpIssuePolicy::ReplaceAlways),
        mailer: MockMailer::failing(),
    };

    assert!(!usecase.execute("a@x.com").await.unwrap());
    assert_eq!(repo.challenges_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_resend_existing_code_within_interval_under_replace_if_stale() {
    let repo = MockOtpRepo::new(vec![challenge_aged(
        OtpChannel::Email,
        "a@x.com",
        None,
        "123456",
        5,
    )]);
    let mailer = MockMailer::default();
    let sent = mailer.sent_handle();
    let usecase = SendEmailOtpUseCase {
        otp: lifecycle(&repo, OtpIssuePolicy::ReplaceIfStale),
        mailer,
    };

    assert!(usecase.execute("a@x.com").await.unwrap());
    assert_eq!(
        *sent.lock().unwrap(),
        vec![("a@x.com".to_owned(), "123456".to_owned())]
    );
    assert_eq!(repo.challenges_handle().lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_report_failed_resend_of_reused_challenge() {
    let repo = MockOtpRepo::new(vec![challenge_aged(
        OtpChannel::Email,
        "a@x.com",
        None,
        "123456",
        5,
    )]);
    let usecase = SendEmailOtpUseCase {
        otp: lifecycle(&repo, OtpIssuePolicy::ReplaceIfStale),
        mailer: MockMailer::failing(),
    };

    assert!(!usecase.execute("a@x.com").await.unwrap());
    assert_eq!(repo.challenges_handle().lock().unwrap()[0].code, "123456");
}

#[tokio::test]
async fn should_reject_malformed_email() {
    let usecase = SendEmailOtpUseCase {
        otp: lifecycle(&MockOtpRepo::empty(), OtpIssuePolicy::ReplaceAlways),
        mailer: MockMailer::default(),
    };
    let result = usecase.execute("not-an-email").await;
    assert!(matches!(result, Err(AuthServiceError::InvalidInput(_))));
}

// ── VerifyEmailOtpUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_mint_registration_token_scoped_to_verified_email() {
    let repo = MockOtpRepo::empty();
    let mailer = MockMailer::default();
    let sent = mailer.sent_handle();
    SendEmailOtpUseCase {
        otp: lifecycle(&repo, OtpIssuePolicy::ReplaceAlways),
        mailer,
    }
    .execute("a@x.com")
    .await
    .unwrap();
    let code = sent.lock().unwrap()[0].1.clone();

    let token = verify_usecase(&repo)
        .execute(verify_input("a@x.com", &code))
        .await
        .unwrap();
    let email = registration_email(&token.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(email.as_str(), "a@x.com");

    // Registration tokens never pass as sessions.
    assert!(
        homerent_auth_types::token::validate_session_token(&token.token, TEST_JWT_SECRET).is_err()
    );

    let again = verify_usecase(&repo)
        .execute(verify_input("a@x.com", &code))
        .await;
    assert!(matches!(again, Err(AuthServiceError::OtpNotFound)));
}

#[tokio::test]
async fn should_not_verify_code_issued_for_another_email() {
    let repo = MockOtpRepo::new(vec![challenge_aged(
        OtpChannel::Email,
        "a@x.com",
        None,
        "123456",
        10,
    )]);
    let result = verify_usecase(&repo)
        .execute(verify_input("b@x.com", "123456"))
        .await;
    assert!(matches!(result, Err(AuthServiceError::OtpNotFound)));
}
