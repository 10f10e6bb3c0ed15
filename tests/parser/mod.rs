mod tests_json;
mod tests_lexer;
mod tests_load;
mod tests_merge;
