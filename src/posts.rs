//! Post records and their CRUD against the `posts` collection.
//!
//! The store assigns `_id` and `createdAt` on creation; updates `$set`
//! only the fields the payload provides and never touch either of those.

use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{DateTime, Document, doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const POSTS_COLLECTION: &str = "posts";

/// Stored shape of a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub shares: i64,
    pub created_at: DateTime,
}

/// Wire shape sent to clients: hex `_id`, RFC 3339 `createdAt`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_hex(),
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            excerpt: post.excerpt,
            link: post.link,
            likes: post.likes,
            comments: post.comments,
            shares: post.shares,
            created_at: post.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

/// Create/update payload. Everything is optional so the same shape serves
/// partial updates; create checks for the required fields itself.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub excerpt: Option<String>,
    pub link: Option<String>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub shares: Option<i64>,
}

pub fn validate_create(input: &PostInput) -> Result<(), AppError> {
    require(&input.title, "title")?;
    require(&input.content, "content")?;
    require(&input.image_url, "imageUrl")?;
    require(&input.excerpt, "excerpt")?;
    validate_counters(input)
}

/// Partial updates may omit fields, but a provided required field must not
/// be blanked out.
pub fn validate_update(input: &PostInput) -> Result<(), AppError> {
    not_blank(&input.title, "title")?;
    not_blank(&input.content, "content")?;
    not_blank(&input.image_url, "imageUrl")?;
    not_blank(&input.excerpt, "excerpt")?;
    validate_counters(input)
}

fn require(value: &Option<String>, field: &str) -> Result<(), AppError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

fn not_blank(value: &Option<String>, field: &str) -> Result<(), AppError> {
    match value {
        Some(text) if text.trim().is_empty() => {
            Err(AppError::Validation(format!("{field} must not be empty")))
        }
        _ => Ok(()),
    }
}

fn validate_counters(input: &PostInput) -> Result<(), AppError> {
    for (value, field) in [
        (input.likes, "likes"),
        (input.comments, "comments"),
        (input.shares, "shares"),
    ] {
        if value.is_some_and(|count| count < 0) {
            return Err(AppError::Validation(format!("{field} must not be negative")));
        }
    }

    Ok(())
}

/// Fields to `$set`, exactly as provided. `_id` and `createdAt` are never
/// part of an update.
fn change_set(input: &PostInput) -> Document {
    let mut set = Document::new();

    if let Some(title) = &input.title {
        set.insert("title", title.as_str());
    }
    if let Some(content) = &input.content {
        set.insert("content", content.as_str());
    }
    if let Some(image_url) = &input.image_url {
        set.insert("imageUrl", image_url.as_str());
    }
    if let Some(excerpt) = &input.excerpt {
        set.insert("excerpt", excerpt.as_str());
    }
    if let Some(link) = &input.link {
        set.insert("link", link.as_str());
    }
    if let Some(likes) = input.likes {
        set.insert("likes", likes);
    }
    if let Some(comments) = input.comments {
        set.insert("comments", comments);
    }
    if let Some(shares) = input.shares {
        set.insert("shares", shares);
    }

    set
}

fn posts(db: &Database) -> Collection<Post> {
    db.collection::<Post>(POSTS_COLLECTION)
}

/// An id that cannot address a stored record does not exist.
fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::NotFound(id.to_string()))
}

/// Every post, most recent first.
pub async fn list_posts(db: &Database) -> Result<Vec<Post>, AppError> {
    let options = FindOptions::builder()
        .sort(doc! { "createdAt": -1 })
        .build();

    let cursor = posts(db).find(doc! {}).with_options(options).await?;
    let all: Vec<Post> = cursor.try_collect().await?;

    Ok(all)
}

pub async fn create_post(db: &Database, input: PostInput) -> Result<Post, AppError> {
    validate_create(&input)?;

    let post = Post {
        id: ObjectId::new(),
        title: input.title.unwrap_or_default(),
        content: input.content.unwrap_or_default(),
        image_url: input.image_url.unwrap_or_default(),
        excerpt: input.excerpt.unwrap_or_default(),
        link: input.link,
        likes: input.likes.unwrap_or(0),
        comments: input.comments.unwrap_or(0),
        shares: input.shares.unwrap_or(0),
        created_at: DateTime::now(),
    };

    posts(db).insert_one(&post).await?;

    Ok(post)
}

pub async fn update_post(db: &Database, id: &str, input: PostInput) -> Result<Post, AppError> {
    validate_update(&input)?;

    let oid = parse_id(id)?;
    let changes = change_set(&input);

    // The server rejects an empty `$set`; a no-field update is a lookup.
    if changes.is_empty() {
        return posts(db)
            .find_one(doc! { "_id": oid })
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()));
    }

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    posts(db)
        .find_one_and_update(doc! { "_id": oid }, doc! { "$set": changes })
        .with_options(options)
        .await?
        .ok_or_else(|| AppError::NotFound(id.to_string()))
}

pub async fn delete_post(db: &Database, id: &str) -> Result<(), AppError> {
    let oid = parse_id(id)?;
    let deleted = posts(db).delete_one(doc! { "_id": oid }).await?;

    if deleted.deleted_count == 0 {
        return Err(AppError::NotFound(id.to_string()));
    }

    Ok(())
}
