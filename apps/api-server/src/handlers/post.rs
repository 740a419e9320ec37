//! Post handlers.

use actix_web::{HttpResponse, web};

use blog_core::domain::{Post, PostContent, RECENT_POSTS_LIMIT};
use blog_core::ports::BaseRepository;
use blog_shared::dto::UpdatePostRequest;
use blog_shared::{ApiResponse, MessageResponse};

use super::parse_id;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::upload::UploadForm;
use crate::state::AppState;

/// POST /api/v1/post/create
///
/// Multipart form: `title`, `summary`, `content` and either a `file` image
/// or a `cover` URL.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    mut form: UploadForm,
) -> AppResult<HttpResponse> {
    let cover = match form.file.take() {
        Some(file) => {
            tracing::debug!(key = %file.key, "Using uploaded cover");
            file.url
        }
        None => form.take_field("cover"),
    };
    if cover.trim().is_empty() {
        return Err(AppError::BadRequest("Image is required".to_string()));
    }

    let body = PostContent {
        title: form.take_field("title"),
        summary: form.take_field("summary"),
        content: form.take_field("content"),
        cover,
    };
    body.validate()?;

    let post = state.posts.insert(Post::new(identity.user_id, body)).await?;

    tracing::info!(post_id = %post.id, author_id = %identity.user_id, "Post created");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        post,
        "Create a new post successfully",
    )))
}

/// GET /api/v1/post
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.find_recent(RECENT_POSTS_LIMIT).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/v1/post/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;

    let post = state
        .posts
        .find_with_author(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// GET /api/v1/post/author/{id}
pub async fn list_posts_by_author(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let author_id = parse_id(&path, "Author")?;

    let posts = state
        .posts
        .find_by_author(author_id, RECENT_POSTS_LIMIT)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// PUT /api/v1/post/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;
    let req = body.into_inner();

    let body = PostContent {
        title: req.title,
        summary: req.summary,
        content: req.content,
        cover: req.cover,
    };
    body.validate()?;

    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    post.ensure_author(identity.user_id)?;

    post.replace(body);
    let post = state.posts.update(post).await?;

    tracing::info!(post_id = %post.id, "Post updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        post,
        "Post updated successfully",
    )))
}

/// DELETE /api/v1/post/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "Post")?;

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    post.ensure_author(identity.user_id)?;

    state.posts.delete(post.id).await?;

    tracing::info!(post_id = %id, author_id = %identity.user_id, "Post deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::{StatusCode, header};
    use actix_web::test;
    use blog_core::domain::User;
    use blog_infra::InMemoryObjectStorage;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::handlers::test_support;

    const BOUNDARY: &str = "----blogtestboundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File {
            filename: &'a str,
            content_type: &'a str,
            bytes: Vec<u8>,
        },
    }

    fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                            name, value
                        )
                        .as_bytes(),
                    );
                }
                Part::File {
                    filename,
                    content_type,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                            filename, content_type
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn text_fields() -> Vec<Part<'static>> {
        vec![
            Part::Text("title", "Hello"),
            Part::Text("summary", "A short summary"),
            Part::Text("content", "The body of the post"),
        ]
    }

    /// Test state whose object store stays inspectable.
    fn state_with_storage() -> (AppState, Arc<InMemoryObjectStorage>) {
        let storage = Arc::new(InMemoryObjectStorage::default());
        let mut state = test_support::state();
        state.storage = storage.clone();
        (state, storage)
    }

    async fn register(state: &AppState, username: &str) -> (User, String) {
        let user = state
            .users
            .insert(User::new(username.to_string(), "hash".to_string()))
            .await
            .unwrap();
        let token = state.tokens.generate_token(user.id, &user.username).unwrap();
        (user, token)
    }

    fn create_request(token: &str, parts: &[Part<'_>]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/v1/post/create")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart(parts))
    }

    async fn seed_post(state: &AppState, author: &User, title: &str) -> Post {
        state
            .posts
            .insert(Post::new(
                author.id,
                PostContent {
                    title: title.to_string(),
                    summary: "summary".to_string(),
                    content: "content".to_string(),
                    cover: "https://cdn.example.com/cover.png".to_string(),
                },
            ))
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn test_create_post_uploads_cover() {
        let (state, storage) = state_with_storage();
        let (author, token) = register(&state, "alice").await;
        let app = test::init_service(test_support::app(state.clone())).await;

        let mut parts = text_fields();
        parts.push(Part::File {
            filename: "cover.png",
            content_type: "image/png",
            bytes: vec![0x89, b'P', b'N', b'G'],
        });

        let resp = test::call_service(&app, create_request(&token, &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = test_support::json(resp).await;
        let cover = body["data"]["cover"].as_str().unwrap();
        assert!(cover.contains("uploads/"));
        assert!(cover.ends_with("-cover.png"));
        assert_eq!(body["data"]["author_id"], author.id.to_string());
        assert_eq!(body["data"]["title"], "Hello");

        let key = cover.trim_start_matches("memory://blog-files/");
        let stored = storage.get(key).await.expect("cover should be stored");
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[actix_web::test]
    async fn test_create_post_ignores_empty_file_part() {
        let (state, storage) = state_with_storage();
        let (_author, token) = register(&state, "alice").await;
        let app = test::init_service(test_support::app(state)).await;

        let mut parts = text_fields();
        parts.push(Part::File {
            filename: "",
            content_type: "application/octet-stream",
            bytes: Vec::new(),
        });
        parts.push(Part::Text("cover", "https://cdn.example.com/existing.png"));

        let resp = test::call_service(&app, create_request(&token, &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = test_support::json(resp).await;
        assert_eq!(body["data"]["cover"], "https://cdn.example.com/existing.png");
        assert_eq!(storage.len().await, 0);
    }

    #[actix_web::test]
    async fn test_create_post_rejects_too_many_fields() {
        let state = test_support::state();
        let (_author, token) = register(&state, "alice").await;
        let app = test::init_service(test_support::app(state)).await;

        let names: Vec<String> = (0..=crate::middleware::upload::MAX_FIELDS)
            .map(|i| format!("extra{i}"))
            .collect();
        let parts: Vec<Part<'_>> = names.iter().map(|n| Part::Text(n, "x")).collect();

        let resp = test::call_service(&app, create_request(&token, &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_create_post_accepts_cover_url_without_file() {
        let state = test_support::state();
        let (_author, token) = register(&state, "alice").await;
        let app = test::init_service(test_support::app(state)).await;

        let mut parts = text_fields();
        parts.push(Part::Text("cover", "https://cdn.example.com/existing.png"));

        let resp = test::call_service(&app, create_request(&token, &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = test_support::json(resp).await;
        assert_eq!(body["data"]["cover"], "https://cdn.example.com/existing.png");
    }

    #[actix_web::test]
    async fn test_create_post_without_cover_is_rejected() {
        let state = test_support::state();
        let (_author, token) = register(&state, "alice").await;
        let app = test::init_service(test_support::app(state.clone())).await;

        let resp =
            test::call_service(&app, create_request(&token, &text_fields()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = test_support::json(resp).await;
        assert_eq!(body["detail"], "Image is required");
        assert!(state.posts.find_recent(20).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_create_post_missing_fields_is_rejected() {
        let state = test_support::state();
        let (_author, token) = register(&state, "alice").await;
        let app = test::init_service(test_support::app(state)).await;

        let parts = [
            Part::Text("title", "Only a title"),
            Part::Text("cover", "https://cdn.example.com/existing.png"),
        ];

        let resp = test::call_service(&app, create_request(&token, &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = test_support::json(resp).await;
        assert_eq!(body["detail"], "Please provide all fields");
    }

    #[actix_web::test]
    async fn test_create_post_rejects_non_image() {
        let (state, storage) = state_with_storage();
        let (_author, token) = register(&state, "alice").await;
        let app = test::init_service(test_support::app(state)).await;

        let mut parts = text_fields();
        parts.push(Part::File {
            filename: "notes.txt",
            content_type: "text/plain",
            bytes: b"hello".to_vec(),
        });

        let resp = test::call_service(&app, create_request(&token, &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(storage.len().await, 0);
    }

    #[actix_web::test]
    async fn test_create_post_rejects_oversized_file() {
        let (state, storage) = state_with_storage();
        let (_author, token) = register(&state, "alice").await;
        let app = test::init_service(test_support::app(state)).await;

        let mut parts = text_fields();
        parts.push(Part::File {
            filename: "huge.jpg",
            content_type: "image/jpeg",
            bytes: vec![0u8; crate::middleware::upload::MAX_FILE_SIZE + 1],
        });

        let resp = test::call_service(&app, create_request(&token, &parts).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(storage.len().await, 0);
    }

    #[actix_web::test]
    async fn test_create_post_requires_authentication() {
        let state = test_support::state();
        let app = test::init_service(test_support::app(state)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/post/create")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart(&text_fields()))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_list_posts_is_newest_first_and_capped() {
        let state = test_support::state();
        let (author, _token) = register(&state, "alice").await;
        let base = Utc::now();
        for i in 0..25 {
            let mut post = seed_post(&state, &author, &format!("post {i}")).await;
            post.created_at = base + Duration::seconds(i);
            state.posts.update(post).await.unwrap();
        }
        let app = test::init_service(test_support::app(state)).await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/api/v1/post").to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test_support::json(resp).await;
        let posts = body["data"].as_array().unwrap();
        assert_eq!(posts.len(), 20);
        assert_eq!(posts[0]["title"], "post 24");
        assert_eq!(posts[19]["title"], "post 5");
        assert_eq!(posts[0]["author"]["username"], "alice");
    }

    #[actix_web::test]
    async fn test_get_post_by_id() {
        let state = test_support::state();
        let (author, _token) = register(&state, "alice").await;
        let post = seed_post(&state, &author, "Findable").await;
        let app = test::init_service(test_support::app(state)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/post/{}", post.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test_support::json(resp).await;
        assert_eq!(body["data"]["title"], "Findable");
        assert_eq!(body["data"]["author"]["id"], author.id.to_string());

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/post/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/v1/post/not-a-uuid")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_list_posts_by_author() {
        let state = test_support::state();
        let (alice, _) = register(&state, "alice").await;
        let (bob, _) = register(&state, "bob").await;
        seed_post(&state, &alice, "a1").await;
        seed_post(&state, &bob, "b1").await;
        seed_post(&state, &alice, "a2").await;
        let app = test::init_service(test_support::app(state)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/post/author/{}", alice.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test_support::json(resp).await;
        let posts = body["data"].as_array().unwrap();
        assert_eq!(posts.len(), 2);
        assert!(
            posts
                .iter()
                .all(|p| p["author_id"] == alice.id.to_string())
        );
    }

    #[actix_web::test]
    async fn test_update_post_by_author() {
        let state = test_support::state();
        let (author, token) = register(&state, "alice").await;
        let post = seed_post(&state, &author, "Before").await;
        let app = test::init_service(test_support::app(state.clone())).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/post/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .set_json(json!({
                "title": "After",
                "summary": "new summary",
                "content": "new content",
                "cover": "https://cdn.example.com/new.png"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "After");
        assert_eq!(stored.cover, "https://cdn.example.com/new.png");
        assert_eq!(stored.created_at, post.created_at);
    }

    #[actix_web::test]
    async fn test_update_post_requires_all_fields() {
        let state = test_support::state();
        let (author, token) = register(&state, "alice").await;
        let post = seed_post(&state, &author, "Before").await;
        let app = test::init_service(test_support::app(state)).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/post/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .set_json(json!({ "title": "After" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_update_post_by_non_author_is_forbidden() {
        let state = test_support::state();
        let (author, _) = register(&state, "alice").await;
        let (_intruder, intruder_token) = register(&state, "mallory").await;
        let post = seed_post(&state, &author, "Mine").await;
        let app = test::init_service(test_support::app(state.clone())).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/post/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", intruder_token)))
            .set_json(json!({
                "title": "Hijacked",
                "summary": "s",
                "content": "c",
                "cover": "https://evil.example.com/x.png"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Mine");
    }

    #[actix_web::test]
    async fn test_delete_post() {
        let state = test_support::state();
        let (author, token) = register(&state, "alice").await;
        let (_intruder, intruder_token) = register(&state, "mallory").await;
        let post = seed_post(&state, &author, "Doomed").await;
        let app = test::init_service(test_support::app(state.clone())).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/post/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", intruder_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(state.posts.find_by_id(post.id).await.unwrap().is_some());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/post/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.posts.find_by_id(post.id).await.unwrap().is_none());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/post/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
