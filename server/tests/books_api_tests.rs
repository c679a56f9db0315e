use std::sync::Arc;

use bookshelf_catalog::{BookService, Page};
use bookshelf_server::{build_router, ErrorBody};
use bookshelf_store::SqliteStore;
use bookshelf_types::Book;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

struct TestServer {
    base: String,
    service: BookService,
    client: reqwest::Client,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn create(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/books"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> T {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 200, "GET {path}");
        resp.json().await.unwrap()
    }
}

/// Spin up the HTTP server on an OS-assigned port with an in-memory store.
async fn spawn_test_server() -> TestServer {
    let service = BookService::new(Arc::new(SqliteStore::open_in_memory().unwrap()));
    let app = build_router(service.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base: format!("http://127.0.0.1:{}", port),
        service,
        client: reqwest::Client::new(),
    }
}

async fn seeded_server() -> (TestServer, Vec<Book>) {
    let server = spawn_test_server().await;
    let mut books = Vec::new();
    for body in [
        json!({"title": "The Hobbit", "author": "J.R.R. Tolkien", "genre": "Fantasy", "publicationDate": "1937-09-21"}),
        json!({"title": "Dune", "author": "Frank Herbert", "genre": "Science Fiction", "publicationDate": "1965-08-01"}),
        json!({"title": "Emma", "author": "Jane Austen", "genre": "Romance", "publicationDate": "1815-12-23"}),
        json!({"title": "Neuromancer", "author": "William Gibson", "genre": "Science Fiction"}),
        json!({"title": "Beloved", "author": "Toni Morrison", "genre": "Literary Fiction", "publicationDate": "1987-09-02"}),
    ] {
        let resp = server.create(body).await;
        assert_eq!(resp.status(), 201);
        books.push(resp.json().await.unwrap());
    }
    (server, books)
}

fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_deref().unwrap_or("")).collect()
}

// ── POST /books ──────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_201_with_generated_id() {
    let server = spawn_test_server().await;
    let resp = server.create(json!({"title": "Dune"})).await;
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["title"], "Dune");
    let id = body["id"].as_str().unwrap();
    assert!(bookshelf_types::BookId::parse(id).is_ok());
    assert!(body["createdAt"].is_string());
    assert!(body.get("author").is_none());

    let all = server.service.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id.to_string(), id);
}

#[tokio::test]
async fn create_echoes_publication_date_in_wire_format() {
    let server = spawn_test_server().await;
    let resp = server
        .create(json!({"title": "Dune", "publicationDate": "1965-08-01"}))
        .await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["publicationDate"], "1965-08-01T00:00:00.000Z");
}

#[tokio::test]
async fn create_malformed_date_is_400_with_message() {
    let server = spawn_test_server().await;
    let resp = server
        .create(json!({"title": "Dune", "publicationDate": "not-a-date"}))
        .await;
    assert_eq!(resp.status(), 400);

    let body: ErrorBody = resp.json().await.unwrap();
    assert!(body.message.contains("publicationDate"));
}

#[tokio::test]
async fn create_out_of_range_date_is_400_and_list_still_works() {
    let (server, books) = seeded_server().await;
    let resp = server
        .create(json!({"title": "Far", "publicationDate": 253_402_300_800_000_i64}))
        .await;
    assert_eq!(resp.status(), 400);

    let listed: Vec<Book> = server.get_json("/books").await;
    assert_eq!(listed, books);
}

#[tokio::test]
async fn create_invalid_json_is_400_with_message() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .post(server.url("/books"))
        .header("content-type", "application/json")
        .body("{\"title\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].is_string());
    assert_eq!(body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn create_without_json_content_type_is_400() {
    let server = spawn_test_server().await;
    let resp = server
        .client
        .post(server.url("/books"))
        .body("title=Dune")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let _: ErrorBody = resp.json().await.unwrap();
}

// ── GET /books (combined) ────────────────────────────────────────

#[tokio::test]
async fn list_defaults_to_ten_oldest_first() {
    let server = spawn_test_server().await;
    let mut created = Vec::new();
    for i in 0..12 {
        let resp = server.create(json!({"title": format!("Book {i:02}")})).await;
        created.push(resp.json::<Book>().await.unwrap());
    }

    let listed: Vec<Book> = server.get_json("/books").await;
    assert_eq!(listed, created[..10].to_vec());
}

#[tokio::test]
async fn list_pages_with_limit() {
    let (server, books) = seeded_server().await;
    let listed: Vec<Book> = server.get_json("/books?page=2&limit=2").await;
    assert_eq!(listed, books[2..4].to_vec());
}

#[tokio::test]
async fn list_sort_desc_reverses_creation_order() {
    let (server, books) = seeded_server().await;
    let listed: Vec<Book> = server.get_json("/books?sort=desc&limit=100").await;

    let mut expected = books.clone();
    expected.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn list_zero_limit_is_empty() {
    let (server, _) = seeded_server().await;
    let listed: Vec<Book> = server.get_json("/books?limit=0").await;
    assert!(listed.is_empty());
}

#[tokio::test]
async fn list_ignores_filter_parameter() {
    let (server, books) = seeded_server().await;
    let listed: Vec<Book> = server.get_json("/books?filter=Dune&title=Dune").await;
    assert_eq!(listed.len(), books.len());
}

#[tokio::test]
async fn list_invalid_sort_is_500() {
    let (server, _) = seeded_server().await;
    let resp = server.client.get(server.url("/books?sort=title")).send().await.unwrap();
    assert_eq!(resp.status(), 500);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(body.message.contains("sort"));
}

// ── GET /books/filter ────────────────────────────────────────────

#[tokio::test]
async fn filter_author_is_case_insensitive() {
    let (server, _) = seeded_server().await;
    let found: Vec<Book> = server.get_json("/books/filter?author=TOLKIEN").await;
    assert_eq!(titles(&found), vec!["The Hobbit"]);
    assert_eq!(found[0].author.as_deref(), Some("J.R.R. Tolkien"));
}

#[tokio::test]
async fn filter_genre_substring() {
    let (server, _) = seeded_server().await;
    let found: Vec<Book> = server.get_json("/books/filter?genre=fiction").await;
    assert_eq!(titles(&found), vec!["Dune", "Neuromancer", "Beloved"]);
}

#[tokio::test]
async fn filter_publication_date_exact() {
    let (server, _) = seeded_server().await;
    let found: Vec<Book> = server.get_json("/books/filter?publicationDate=1815-12-23").await;
    assert_eq!(titles(&found), vec!["Emma"]);
}

#[tokio::test]
async fn filter_bad_date_is_500() {
    let (server, _) = seeded_server().await;
    let resp = server
        .client
        .get(server.url("/books/filter?publicationDate=yesterday"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: ErrorBody = resp.json().await.unwrap();
    assert!(body.message.contains("yesterday"));
}

#[tokio::test]
async fn filter_unknown_params_return_everything() {
    let (server, books) = seeded_server().await;
    let found: Vec<Book> = server.get_json("/books/filter?isbn=1&createdAt=x").await;
    assert_eq!(found, books);
}

#[tokio::test]
async fn filter_is_idempotent() {
    let (server, _) = seeded_server().await;
    let first: Vec<Book> = server.get_json("/books/filter?title=e").await;
    let second: Vec<Book> = server.get_json("/books/filter?title=e").await;
    assert_eq!(first, second);
}

// ── GET /books/paginate ──────────────────────────────────────────

#[tokio::test]
async fn paginate_second_page() {
    let (server, books) = seeded_server().await;
    let page: Page = server.get_json("/books/paginate?page=2&pageSize=2").await;
    assert_eq!(page.total_books, 5);
    assert_eq!(page.books, books[2..4].to_vec());
}

#[tokio::test]
async fn paginate_defaults_to_first_two() {
    let (server, books) = seeded_server().await;
    let page: Page = server.get_json("/books/paginate").await;
    assert_eq!(page.books, books[..2].to_vec());
}

#[tokio::test]
async fn paginate_response_shape() {
    let (server, _) = seeded_server().await;
    let body: Value = server.get_json("/books/paginate?pageSize=1").await;
    assert_eq!(body["totalBooks"], 5);
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn paginate_zero_page_size_is_empty() {
    let (server, _) = seeded_server().await;
    let page: Page = server.get_json("/books/paginate?pageSize=0").await;
    assert!(page.books.is_empty());
    assert_eq!(page.total_books, 5);
}

#[tokio::test]
async fn paginate_negative_page_is_500() {
    let (server, _) = seeded_server().await;
    let resp = server
        .client
        .get(server.url("/books/paginate?page=-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
}

// ── GET /books/sort ──────────────────────────────────────────────

#[tokio::test]
async fn sort_title_desc() {
    let (server, _) = seeded_server().await;
    let sorted: Vec<Book> = server.get_json("/books/sort?sort=title&order=desc").await;
    assert_eq!(
        titles(&sorted),
        vec!["The Hobbit", "Neuromancer", "Emma", "Dune", "Beloved"]
    );
}

#[tokio::test]
async fn sort_defaults_to_title_asc() {
    let (server, _) = seeded_server().await;
    let sorted: Vec<Book> = server.get_json("/books/sort").await;
    assert_eq!(
        titles(&sorted),
        vec!["Beloved", "Dune", "Emma", "Neuromancer", "The Hobbit"]
    );
}

#[tokio::test]
async fn sort_unknown_field_is_200() {
    let (server, books) = seeded_server().await;
    let sorted: Vec<Book> = server.get_json("/books/sort?sort=isbn").await;
    assert_eq!(sorted, books);
}

// ── misc ─────────────────────────────────────────────────────────

#[tokio::test]
async fn responses_are_json() {
    let (server, _) = seeded_server().await;
    let resp = server.client.get(server.url("/books/sort")).send().await.unwrap();
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("application/json"));
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let server = spawn_test_server().await;
    let resp = server.client.get(server.url("/authors")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}
