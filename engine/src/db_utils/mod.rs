pub mod sql_http_utils;
