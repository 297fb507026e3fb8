use std::time::Duration;

use faktory_lib::fs::{DeleteStatus, delete_directory, delete_file, delete_files};
use tempfile::TempDir;

#[cfg(target_os = "linux")]
use super::common::record_lock_file;
use super::common::{create_file, create_files, create_folder, create_folder_with_files, lock_file};

const HOLD: Duration = Duration::from_secs(3);

#[test]
fn delete_file_deletes_file() {
  let base = TempDir::new().unwrap();
  let file = create_file(base.path(), "fileToDelete.txt");

  let result = delete_file(&file);

  assert!(result.message().is_empty());
  assert_eq!(result.status(), DeleteStatus::Ok);
  assert!(!file.exists());
}

#[test]
fn delete_file_when_locked_reports_lock() {
  let base = TempDir::new().unwrap();
  let file = create_file(base.path(), "lockedFile_deleteTest.txt");
  let held = lock_file(&file, HOLD);

  let result = delete_file(&file);

  assert_eq!(result.status(), DeleteStatus::Error);
  assert!(
    result
      .message()
      .starts_with(&format!("Can't delete `{}`. It's locked by ", file.display())),
    "unexpected message: {}",
    result.message()
  );
  assert!(result.is_locked());
  assert!(file.exists());

  drop(held);
  assert!(delete_file(&file).is_ok());
}

#[cfg(target_os = "linux")]
#[test]
fn delete_file_when_record_locked_reports_lock() {
  let base = TempDir::new().unwrap();
  let file = create_file(base.path(), "recordLocked.txt");
  let held = record_lock_file(&file, HOLD);

  let result = delete_file(&file);

  assert_eq!(result.status(), DeleteStatus::Error);
  assert!(
    result
      .message()
      .starts_with(&format!("Can't delete `{}`. It's locked by ", file.display())),
    "unexpected message: {}",
    result.message()
  );
  assert!(file.exists());

  drop(held);
  assert!(delete_file(&file).is_ok());
  assert!(!file.exists());
}

#[cfg(target_os = "linux")]
#[test]
fn delete_file_removes_fifo_without_blocking() {
  use rustix::fs::{CWD, FileType, Mode, mknodat};
  use std::sync::mpsc;
  use std::thread;

  let base = TempDir::new().unwrap();
  let fifo = base.path().join("pipe");
  mknodat(CWD, &fifo, FileType::Fifo, Mode::RUSR | Mode::WUSR, 0).unwrap();

  let (tx, rx) = mpsc::channel();
  let target = fifo.clone();
  thread::spawn(move || tx.send(delete_file(&target)).unwrap());

  let result = rx.recv_timeout(HOLD).expect("delete_file blocked on a FIFO");
  assert_eq!(result.status(), DeleteStatus::Ok);
  assert!(std::fs::symlink_metadata(&fifo).is_err());
}

#[cfg(target_os = "linux")]
#[test]
fn delete_directory_with_record_locked_file() {
  let base = TempDir::new().unwrap();
  let directory = base.path().join("records");
  let files = create_folder_with_files(&directory, 2);
  let _held = record_lock_file(&files[1], HOLD);

  let result = delete_directory(&directory);

  assert_eq!(result.status(), DeleteStatus::Error);
  assert_eq!(result.locked_paths(), &[files[1].clone()]);
  assert!(files[0].exists());
}

#[test]
fn delete_multiple_files() {
  let base = TempDir::new().unwrap();
  let files = create_files(5, base.path());

  let result = delete_files(&files);

  assert!(result.message().is_empty());
  assert_eq!(result.status(), DeleteStatus::Ok);
  for file in &files {
    assert!(!file.exists());
  }
}

#[test]
fn delete_multiple_files_with_one_locked() {
  let base = TempDir::new().unwrap();
  let files = create_files(3, base.path());
  let _held = lock_file(&files[1], HOLD);

  let result = delete_files(&files);

  assert_eq!(result.status(), DeleteStatus::Error);
  assert_eq!(result.locked_paths(), &[files[1].clone()]);
  assert!(!files[0].exists());
  assert!(files[1].exists());
  assert!(!files[2].exists());
}

#[test]
fn delete_directory_when_empty() {
  let base = TempDir::new().unwrap();
  let directory = create_folder(&base.path().join("DeleteDirTestFolder"));

  let result = delete_directory(&directory);

  assert!(result.message().is_empty());
  assert_eq!(result.status(), DeleteStatus::Ok);
  assert!(!directory.exists());
}

#[test]
fn delete_directory_when_not_empty() {
  let base = TempDir::new().unwrap();
  let directory = base.path().join("DeleteDirTestFolder");
  let files = create_folder_with_files(&directory, 4);

  let result = delete_directory(&directory);

  assert!(result.message().is_empty());
  assert_eq!(result.status(), DeleteStatus::Ok);
  assert!(!directory.exists());
  for file in &files {
    assert!(!file.exists());
  }
}

#[test]
fn delete_directory_with_locked_file() {
  let base = TempDir::new().unwrap();
  let directory = base.path().join("output");
  let files = create_folder_with_files(&directory.join("nested"), 2);
  let _held = lock_file(&files[0], HOLD);

  let result = delete_directory(&directory);

  assert_eq!(result.status(), DeleteStatus::Error);
  assert!(
    result
      .message()
      .starts_with(&format!("Can't delete `{}`. It's locked by ", files[0].display())),
    "unexpected message: {}",
    result.message()
  );
  assert!(directory.exists());
}
