pub mod search_queries;
