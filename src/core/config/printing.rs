use crate::core::config::data::{path_display, Config};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.archive {
            Some(archive) => println!("  archive: {}", path_display(archive)),
            None => println!("  archive: (unset)"),
        }
        println!("  session-file: {}", self.session_file);
        println!("  ascii-art-width: {}", self.ascii_width());
        println!("  max-messages: {}", self.page_size());
    }
}
