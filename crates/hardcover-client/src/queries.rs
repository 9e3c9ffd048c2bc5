//! GraphQL documents sent to the Hardcover API

pub const SEARCH_BOOKS: &str = r#"
query SearchBooks($query: String!, $limit: Int = 10) {
  books(
    where: {
      _or: [
        { title: { _ilike: $query } }
        { author_users: { user: { name: { _ilike: $query } } } }
      ]
    }
    limit: $limit
    order_by: { users_read_count: desc }
  ) {
    id
    title
    description
    release_date
    rating
    users_read_count
    cached_tags
    images { url width height }
    author_users { user { id name } }
    series_books { series { id name } position }
  }
}
"#;

pub const GET_BOOK_DETAILS: &str = r#"
query GetBook($id: Int!) {
  books_by_pk(id: $id) {
    id
    title
    description
    release_date
    rating
    users_read_count
    pages
    language
    isbn_10
    isbn_13
    cached_tags
    images { url width height }
    author_users { user { id name bio } }
    series_books { series { id name description } position }
    reviews(limit: 5, order_by: { created_at: desc }) {
      id
      body
      rating
      user { name }
      created_at
    }
  }
}
"#;

pub const GET_USER_LIBRARY: &str = r#"
query GetUserLibrary($userId: Int) {
  user_books(
    where: { user_id: { _eq: $userId } }
    order_by: { updated_at: desc }
  ) {
    id
    status
    rating
    progress
    created_at
    updated_at
    book {
      id
      title
      description
      release_date
      rating
      pages
      images { url }
      author_users { user { name } }
    }
  }
}
"#;

pub const ADD_BOOK_TO_LIBRARY: &str = r#"
mutation AddBookToLibrary($bookId: Int!, $status: String!) {
  insert_user_books_one(object: { book_id: $bookId, status: $status }) {
    id
    status
    book { id title }
  }
}
"#;

// `$changes` only carries the columns the caller supplied, so omitted
// rating/progress keep their stored values.
pub const UPDATE_READING_STATUS: &str = r#"
mutation UpdateReadingStatus($id: Int!, $changes: user_books_set_input!) {
  update_user_books_by_pk(pk_columns: { id: $id }, _set: $changes) {
    id
    status
    rating
    progress
  }
}
"#;
