//! Print properties trees back to text.

use crate::tree::*;

pub fn print_file(out: &mut String, file: &File) {
    for content in &file.content {
        print_tree(out, content);
    }
    out.push_str(&file.eof);
}

pub fn print_tree(out: &mut String, tree: &Properties) {
    match tree {
        Properties::File(file) => print_file(out, file),
        Properties::Entry(entry) => {
            out.push_str(&entry.prefix);
            out.push_str(&entry.key);
            out.push_str(&entry.before_equals);
            out.push_str(entry.delimiter.symbol());
            print_tree(out, &entry.value);
        }
        Properties::Value(value) => {
            out.push_str(&value.prefix);
            out.push_str(&value.text);
        }
        Properties::Comment(comment) => {
            out.push_str(&comment.prefix);
            out.push_str(comment.delimiter.symbol());
            out.push_str(&comment.message);
        }
    }
}
