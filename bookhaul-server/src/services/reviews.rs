//! Review service
//!
//! Review CRUD plus the rating aggregate on the parent book. Every
//! mutation recomputes `averageRating` and `reviewCount` from scratch.

use std::collections::HashMap;

use rust_decimal::prelude::*;
use serde::Serialize;
use shared::{AppError, ErrorCode};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use crate::auth::CurrentUser;
use crate::db::models::{BOOK_TABLE, ImageRef, REVIEW_TABLE, Review, USER_TABLE, User};
use crate::db::repository::review::ReviewPatch;
use crate::db::repository::{
    BookRepository, OrderRepository, RepoError, ReviewRepository, UserRepository, parse_id,
};
use crate::utils::AppResult;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_REVIEW_IMAGES};

/// Review as shown to clients, with reviewer and book context
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub book_id: String,
    pub rating: i64,
    pub comment: String,
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewUpdate {
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub images: Option<Vec<ImageRef>>,
}

/// Mean rating rounded to one decimal, 0 for no ratings
pub fn average_rating(ratings: &[i64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: Decimal = ratings.iter().map(|r| Decimal::from(*r)).sum();
    (sum / Decimal::from(ratings.len()))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

fn validate_rating(rating: i64) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Rating must be between 1 and 5",
        ));
    }
    Ok(())
}

fn validate_comment(comment: &str) -> AppResult<String> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Comment is required",
        ));
    }
    if trimmed.len() > MAX_NOTE_LEN {
        return Err(AppError::validation(format!(
            "Comment is too long (max {} characters)",
            MAX_NOTE_LEN
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_images(images: &[ImageRef]) -> AppResult<()> {
    if images.len() > MAX_REVIEW_IMAGES {
        return Err(AppError::with_message(
            ErrorCode::TooManyImages,
            format!("At most {} images per review", MAX_REVIEW_IMAGES),
        ));
    }
    Ok(())
}

fn review_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::ReviewNotFound, format!("Review {} not found", id))
}

fn book_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::BookNotFound, format!("Book {} not found", id))
}

#[derive(Clone)]
pub struct ReviewService {
    reviews: ReviewRepository,
    books: BookRepository,
    orders: OrderRepository,
    users: UserRepository,
}

impl ReviewService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            reviews: ReviewRepository::new(db.clone()),
            books: BookRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    /// Create a verified-purchase review
    ///
    /// The caller needs a delivered order containing the book (matched by
    /// the email on their account) and no earlier review of it.
    pub async fn create(&self, caller: &CurrentUser, input: NewReview) -> AppResult<ReviewView> {
        validate_rating(input.rating)?;
        let comment = validate_comment(&input.comment)?;
        validate_images(&input.images)?;

        let book_record = parse_id(BOOK_TABLE, &input.book_id)?;
        let book = self
            .books
            .find_by_id(&book_record)
            .await?
            .ok_or_else(|| book_not_found(&input.book_id))?;
        let book_id = book_record.to_string();

        let user = self.load_user(&caller.id).await?;

        if !self
            .orders
            .has_delivered_with_book(&user.email, &book_id)
            .await?
        {
            return Err(AppError::with_message(
                ErrorCode::ReviewNotEligible,
                "You can only review books from your delivered orders",
            ));
        }

        let user_id = user.id_string();
        if self
            .reviews
            .find_by_book_and_user(&book_id, &user_id)
            .await?
            .is_some()
        {
            return Err(AppError::new(ErrorCode::ReviewAlreadyExists));
        }

        let now = now_millis();
        let review = Review {
            id: None,
            book: book_id,
            user: user_id,
            rating: input.rating,
            comment,
            images: input.images,
            verified_purchase: true,
            created_at: now,
            updated_at: now,
        };
        let created = match self.reviews.create(review).await {
            Ok(created) => created,
            Err(RepoError::Duplicate(_)) => return Err(AppError::new(ErrorCode::ReviewAlreadyExists)),
            Err(e) => return Err(e.into()),
        };

        self.recompute(&book_record).await?;
        tracing::info!(
            review_id = %created.id_string(),
            book_id = %created.book,
            rating = created.rating,
            "Review created"
        );

        Ok(ReviewView {
            review: created,
            user_name: Some(user.user_name),
            user_email: None,
            book_title: Some(book.title),
        })
    }

    /// Edit a review (author or admin)
    pub async fn update(
        &self,
        caller: &CurrentUser,
        id: &str,
        input: ReviewUpdate,
    ) -> AppResult<Review> {
        let (record, existing) = self.load_owned(caller, id).await?;

        if let Some(rating) = input.rating {
            validate_rating(rating)?;
        }
        let comment = input.comment.as_deref().map(validate_comment).transpose()?;
        if let Some(images) = &input.images {
            validate_images(images)?;
        }

        let patch = ReviewPatch {
            rating: input.rating,
            comment,
            images: input.images,
            updated_at: now_millis(),
        };
        let updated = self.reviews.update(&record, patch).await?;

        self.recompute_for(&existing.book).await?;
        tracing::info!(review_id = %record, "Review updated");
        Ok(updated)
    }

    /// Remove a review (author or admin)
    pub async fn delete(&self, caller: &CurrentUser, id: &str) -> AppResult<()> {
        let (record, existing) = self.load_owned(caller, id).await?;
        self.reviews.delete(&record).await?;
        self.recompute_for(&existing.book).await?;
        tracing::info!(review_id = %record, book_id = %existing.book, "Review deleted");
        Ok(())
    }

    /// Reviews of one book, newest first, with reviewer names
    pub async fn list_for_book(&self, book_id: &str) -> AppResult<Vec<ReviewView>> {
        let book = parse_id(BOOK_TABLE, book_id)?.to_string();
        let reviews = self.reviews.find_by_book(&book).await?;
        let users = self.users_of(&reviews).await?;

        Ok(reviews
            .into_iter()
            .map(|review| {
                let user_name = users.get(&review.user).map(|u| u.user_name.clone());
                ReviewView {
                    review,
                    user_name,
                    user_email: None,
                    book_title: None,
                }
            })
            .collect())
    }

    /// Every review, newest first, with reviewer and book context
    pub async fn list_all(&self) -> AppResult<Vec<ReviewView>> {
        let reviews = self.reviews.find_all().await?;
        let users = self.users_of(&reviews).await?;

        let book_ids: Vec<RecordId> = reviews
            .iter()
            .filter_map(|r| parse_id(BOOK_TABLE, &r.book).ok())
            .collect();
        let titles: HashMap<String, String> = self
            .books
            .find_many(book_ids)
            .await?
            .into_iter()
            .map(|b| (b.id_string(), b.title))
            .collect();

        Ok(reviews
            .into_iter()
            .map(|review| {
                let user = users.get(&review.user);
                ReviewView {
                    user_name: user.map(|u| u.user_name.clone()),
                    user_email: user.map(|u| u.email.clone()),
                    book_title: titles.get(&review.book).cloned(),
                    review,
                }
            })
            .collect())
    }

    /// Recompute the rating aggregate of a book from its reviews
    pub async fn recompute(&self, book: &RecordId) -> AppResult<(f64, i64)> {
        let ratings = self.reviews.ratings_for_book(&book.to_string()).await?;
        let average = average_rating(&ratings);
        let count = ratings.len() as i64;
        self.books.set_rating(book, average, count).await?;
        tracing::debug!(book_id = %book, average, count, "Book rating recomputed");
        Ok((average, count))
    }

    async fn recompute_for(&self, book_id: &str) -> AppResult<()> {
        match parse_id(BOOK_TABLE, book_id) {
            Ok(record) => self.recompute(&record).await.map(|_| ()),
            Err(e) => {
                tracing::warn!(book_id, error = %e, "Review points at an invalid book id");
                Ok(())
            }
        }
    }

    async fn load_user(&self, user_id: &str) -> AppResult<User> {
        let record = parse_id(USER_TABLE, user_id)?;
        self.users
            .find_by_id(&record)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))
    }

    async fn load_owned(&self, caller: &CurrentUser, id: &str) -> AppResult<(RecordId, Review)> {
        let record = parse_id(REVIEW_TABLE, id)?;
        let review = self
            .reviews
            .find_by_id(&record)
            .await?
            .ok_or_else(|| review_not_found(id))?;
        if !caller.can_manage(&review.user) {
            return Err(AppError::permission_denied(
                "Only the author or an admin can change this review",
            ));
        }
        Ok((record, review))
    }

    async fn users_of(&self, reviews: &[Review]) -> AppResult<HashMap<String, User>> {
        let ids: Vec<RecordId> = reviews
            .iter()
            .filter_map(|r| parse_id(USER_TABLE, &r.user).ok())
            .collect();
        Ok(self
            .users
            .find_many(ids)
            .await?
            .into_iter()
            .map(|u| (u.id_string(), u))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rating_rounds_to_one_decimal() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[5]), 5.0);
        assert_eq!(average_rating(&[4, 5]), 4.5);
        // 13 / 3 = 4.333...
        assert_eq!(average_rating(&[4, 4, 5]), 4.3);
        // 14 / 3 = 4.666...
        assert_eq!(average_rating(&[4, 5, 5]), 4.7);
        // 0.05 rounds away from zero: 41 / 20 = 2.05
        let ratings: Vec<i64> = std::iter::repeat_n(2, 19).chain([3]).collect();
        assert_eq!(average_rating(&ratings), 2.1);
    }

    #[test]
    fn test_comment_is_trimmed_and_required() {
        assert_eq!(validate_comment("  great read ").unwrap(), "great read");
        assert_eq!(validate_comment("   ").unwrap_err().code, ErrorCode::RequiredField);
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert_eq!(validate_rating(0).unwrap_err().code, ErrorCode::ValueOutOfRange);
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_image_limit() {
        let images = vec![ImageRef::from_url("http://x/a.png"); 4];
        assert_eq!(
            validate_images(&images).unwrap_err().code,
            ErrorCode::TooManyImages
        );
        assert!(validate_images(&images[..3]).is_ok());
    }
}
