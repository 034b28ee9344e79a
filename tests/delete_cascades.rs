mod test_support;

use test_support::{class, core_with, school, student, StubApi};

#[tokio::test]
async fn deleting_a_school_orphans_its_classes() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, false);

    let school_id = core
        .store
        .save_school(&school("Escola A"))
        .await
        .expect("seed school");
    let class_id = core
        .store
        .save_class(&class("Turma 1", Some(school_id)))
        .await
        .expect("seed class");

    core.store.delete_school(school_id).await.expect("delete");

    let kept = core
        .store
        .class(class_id)
        .await
        .expect("read class")
        .expect("class survives");
    assert_eq!(kept.school_id, None);
    assert!(core.store.school(school_id).await.expect("read").is_none());
}

#[tokio::test]
async fn deleting_a_student_removes_their_attendance() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, false);

    let sid = core
        .store
        .save_student(&student("Ana", None))
        .await
        .expect("seed student");
    core.recorder
        .record(sid, "2026-03-02", true, None)
        .await
        .expect("record");
    core.recorder
        .record(sid, "2026-03-03", false, None)
        .await
        .expect("record");

    core.store.delete_student(sid).await.expect("delete");

    assert!(core
        .store
        .attendance(None, None)
        .await
        .expect("list")
        .is_empty());
}

#[tokio::test]
async fn deleting_a_class_orphans_its_students() {
    let api = StubApi::spawn().await;
    let core = core_with(&api.base_url, false);

    let class_id = core
        .store
        .save_class(&class("Turma 1", None))
        .await
        .expect("seed class");
    let sid = core
        .store
        .save_student(&student("Ana", Some(class_id)))
        .await
        .expect("seed student");

    core.store.delete_class(class_id).await.expect("delete");

    let kept = core
        .store
        .student(sid)
        .await
        .expect("read student")
        .expect("student survives");
    assert_eq!(kept.class_id, None);
}
