mod tests_analyzer;
mod tests_reader;
