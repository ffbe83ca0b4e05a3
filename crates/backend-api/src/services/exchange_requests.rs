use skillswap_database::{
    ExchangeRequest, ExchangeRequestRepository, ExchangeRequestStatus, NewExchangeRequest,
    NewNotification, NotificationRepository, SessionRepository, SkillRepository, User,
    UserRepository,
};
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::error::{ServiceError, ServiceResult};
use crate::routes::models::CreateExchangeRequestRequest;

pub const RECEIVED_NOTIFICATION: &str = "exchange_request_received";

pub async fn create(
    pool: &SqlitePool,
    requester: &User,
    request: CreateExchangeRequestRequest,
) -> ServiceResult<ExchangeRequest> {
    if request.recipient_id == requester.id {
        return Err(ServiceError::bad_request(
            "You cannot send an exchange request to yourself",
        ));
    }

    let session = SessionRepository::new(pool.clone())
        .find_by_id(&request.session_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Session not found"))?;

    let skills = SkillRepository::new(pool.clone());
    for skill_id in [&request.offered_skill_id, &request.requested_skill_id] {
        if skills.find_by_id(skill_id).await?.is_none() {
            return Err(ServiceError::not_found(format!("Skill with ID {skill_id} not found")));
        }
    }

    if UserRepository::new(pool.clone())
        .find_by_id(&request.recipient_id)
        .await?
        .is_none()
    {
        return Err(ServiceError::not_found("Recipient not found"));
    }

    let created = ExchangeRequestRepository::new(pool.clone())
        .create(&NewExchangeRequest {
            session_id: request.session_id,
            requester_id: requester.id.clone(),
            recipient_id: request.recipient_id,
            offered_skill_id: request.offered_skill_id,
            requested_skill_id: request.requested_skill_id,
            message: request.message,
        })
        .await?;

    info!(request = %created.id, requester = %requester.id, "exchange request created");

    notify(
        pool,
        NewNotification {
            recipient_id: created.recipient_id.clone(),
            sender_id: Some(requester.id.clone()),
            title: "New Exchange Request".to_string(),
            message: format!(
                "{} wants to exchange skills with you for \"{}\".",
                requester.name, session.title
            ),
            notification_type: RECEIVED_NOTIFICATION.to_string(),
            exchange_request_id: Some(created.id.clone()),
            session_id: Some(created.session_id.clone()),
        },
    )
    .await;

    Ok(created)
}

pub async fn list_mine(pool: &SqlitePool, user_id: &str) -> ServiceResult<Vec<ExchangeRequest>> {
    Ok(ExchangeRequestRepository::new(pool.clone())
        .list_for_user(user_id)
        .await?)
}

pub async fn list_for_hosted_sessions(
    pool: &SqlitePool,
    user_id: &str,
) -> ServiceResult<Vec<ExchangeRequest>> {
    Ok(ExchangeRequestRepository::new(pool.clone())
        .list_for_host(user_id)
        .await?)
}

pub async fn list_all(pool: &SqlitePool) -> ServiceResult<Vec<ExchangeRequest>> {
    Ok(ExchangeRequestRepository::new(pool.clone()).list_all().await?)
}

pub async fn list_by_session(
    pool: &SqlitePool,
    session_id: &str,
) -> ServiceResult<Vec<ExchangeRequest>> {
    Ok(ExchangeRequestRepository::new(pool.clone())
        .list_by_session(session_id)
        .await?)
}

/// Moves a pending request to its next status on behalf of `actor`.
///
/// The recipient or the session host may accept or reject; only the requester
/// may cancel. Decisions notify the requester.
pub async fn update_status(
    pool: &SqlitePool,
    actor_id: &str,
    id: &str,
    status: Option<&str>,
) -> ServiceResult<ExchangeRequest> {
    let status = status
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ServiceError::bad_request("Status is required"))?;
    let next: ExchangeRequestStatus = status
        .to_lowercase()
        .parse()
        .map_err(|error: skillswap_database::InvalidEnumValue| {
            ServiceError::bad_request(error.to_string())
        })?;
    if next == ExchangeRequestStatus::Pending {
        return Err(ServiceError::bad_request(
            "Status must be accepted, rejected or cancelled",
        ));
    }

    let requests = ExchangeRequestRepository::new(pool.clone());
    let existing = requests
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Exchange request not found"))?;

    if existing.status != ExchangeRequestStatus::Pending {
        return Err(ServiceError::bad_request(format!(
            "Exchange request is already {}",
            existing.status
        )));
    }

    let allowed = match next {
        ExchangeRequestStatus::Cancelled => existing.requester_id == actor_id,
        _ => {
            existing.recipient_id == actor_id
                || SessionRepository::new(pool.clone())
                    .find_by_id(&existing.session_id)
                    .await?
                    .is_some_and(|session| session.host_id == actor_id)
        }
    };
    if !allowed {
        return Err(ServiceError::forbidden(
            "You are not allowed to change this exchange request",
        ));
    }

    let updated = requests
        .transition_status(id, ExchangeRequestStatus::Pending, next)
        .await?
        .ok_or_else(|| ServiceError::bad_request("Exchange request is no longer pending"))?;

    info!(request = %id, status = %next, actor = %actor_id, "exchange request updated");

    if matches!(
        next,
        ExchangeRequestStatus::Accepted | ExchangeRequestStatus::Rejected
    ) {
        notify(pool, decision_notification(&updated, actor_id, next)).await;
    }

    Ok(updated)
}

fn decision_notification(
    request: &ExchangeRequest,
    actor_id: &str,
    status: ExchangeRequestStatus,
) -> NewNotification {
    let label = match status {
        ExchangeRequestStatus::Accepted => "Accepted",
        _ => "Rejected",
    };
    NewNotification {
        recipient_id: request.requester_id.clone(),
        sender_id: Some(actor_id.to_string()),
        title: format!("Exchange Request {label}"),
        message: format!("Your exchange request has been {status}."),
        notification_type: format!("exchange_request_{status}"),
        exchange_request_id: Some(request.id.clone()),
        session_id: Some(request.session_id.clone()),
    }
}

async fn notify(pool: &SqlitePool, notification: NewNotification) {
    if let Err(error) = NotificationRepository::new(pool.clone())
        .create(&notification)
        .await
    {
        warn!(
            recipient = %notification.recipient_id,
            kind = %notification.notification_type,
            %error,
            "failed to create notification"
        );
    }
}
