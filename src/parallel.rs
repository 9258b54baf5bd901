use std::thread;
use std::sync::mpsc;
use std::sync::{ Arc, Mutex };

use log::{ error, info };

use crate::camera::Orthonormal;
use crate::canvas::Canvas;
use crate::scene::Scene;

pub enum Message {
    Row(usize),
    Terminate,
}

/// A finished row: its index and packed pixels.
pub type RowResult = (usize, Vec<u32>);

struct Worker {
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(scene: Arc<Scene>, basis: Orthonormal,
        receiver: Arc<Mutex<mpsc::Receiver<Message>>>,
        results: mpsc::Sender<RowResult>) -> Worker {

        let thread = thread::spawn(move || loop {
            // Obtain the message being executed. The lock is released as soon
            // as a message arrives.
            let message = match receiver.lock() {
                Ok(receiver) => receiver.recv(),
                Err(_) => break,
            };

            match message {
                Ok(Message::Row(j)) => {
                    let row = scene.render_row(j, &basis);
                    if results.send((j, row)).is_err() {
                        break;
                    }
                },

                // Exit the worker thread loop, terminating the thread.
                Ok(Message::Terminate) | Err(_) => break,
            }
        });

        Worker { thread: Some(thread) }
    }
}

pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Message>,
}

impl ThreadPool {
    /// Spawns `size` workers rendering rows of `scene`. Every finished row
    /// is sent to `results`.
    pub fn new(size: usize, scene: Arc<Scene>,
        results: mpsc::Sender<RowResult>) -> ThreadPool {
        // There should be at least one thread to run workers.
        let size = size.max(1);

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));
        let basis = scene.camera.basis();

        let mut workers = Vec::with_capacity(size);

        for _ in 0..size {
            workers.push(Worker::new(
                Arc::clone(&scene),
                basis,
                Arc::clone(&receiver),
                results.clone()
            ));
        }

        ThreadPool { workers, sender }
    }

    pub fn execute(&self, message: Message) {
        // Sending only fails once every worker has exited.
        if self.sender.send(message).is_err() {
            error!("No render workers left to accept work");
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        for _ in &self.workers {
            let _ = self.sender.send(Message::Terminate);
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    error!("A render worker panicked");
                }
            }
        }
    }
}

/// Renders `scene` on `threads` worker threads, one row at a time.
///
/// The image is identical to `Scene::render`. With a single thread the
/// scene is rendered on the calling thread.
pub fn render(scene: Arc<Scene>, threads: usize) -> Canvas {
    if threads <= 1 {
        return scene.render();
    }

    info!(
        "Rendering {}x{} image using {} threads",
        scene.width, scene.height, threads
    );

    let (results, finished) = mpsc::channel();
    {
        let pool = ThreadPool::new(threads, Arc::clone(&scene), results);

        for j in 0..scene.height {
            pool.execute(Message::Row(j));
        }

        // Dropping the pool waits for every queued row.
    }

    // All senders are gone once the workers exit, which ends this loop.
    let mut canvas = Canvas::new(scene.width, scene.height);
    let mut rows = 0;
    for (j, row) in finished {
        canvas.write_row(j, &row);
        rows += 1;
    }

    if rows != scene.height {
        error!("Only {} of {} rows were rendered", rows, scene.height);
    }

    info!("Finished rendering");
    canvas
}

#[cfg(test)]
use crate::tuple::{ Point3, Vector3 };
#[cfg(test)]
use crate::color::Color;

#[cfg(test)]
fn test_scene() -> Scene {
    use crate::camera::Camera;
    use crate::light::{ Light, Material };
    use crate::shape::Shape;
    use crate::world::World;

    let mut world = World::empty();
    world.ambient = Color::rgb(0.1, 0.1, 0.1);
    world.lights.push(Light::point(Point3::new(-5.0, 5.0, 5.0), Color::white()));
    world.shapes.push(
        Shape::plane(Point3::new(0.0, -1.0, 0.0), Vector3::new(0.0, 1.0, 0.0))
            .with_material(Material {
                diffuse: Color::rgb(0.5, 0.5, 0.5),
                specular: Color::rgb(0.3, 0.3, 0.3),
                ..Default::default()
            })
    );
    world.shapes.push(
        Shape::sphere(Point3::origin(), 1.0).with_material(Material {
            diffuse: Color::rgb(0.8, 0.2, 0.1),
            specular: Color::rgb(0.5, 0.5, 0.5),
            shininess: 50.0,
        })
    );

    let camera = Camera::new(
        Point3::new(0.0, 1.0, 6.0),
        Point3::origin(),
        Vector3::new(0.0, 1.0, 0.0),
        50.0
    );

    Scene::new(24, 17, camera, world)
}

#[test]
fn parallel_matches_sequential() {
    let scene = Arc::new(test_scene());
    let sequential = scene.render();

    for &threads in [2, 3, 8].iter() {
        assert_eq!(render(Arc::clone(&scene), threads), sequential);
    }
}

#[test]
fn single_thread_renders_inline() {
    let scene = Arc::new(test_scene());
    assert_eq!(render(Arc::clone(&scene), 1), scene.render());
    assert_eq!(render(Arc::clone(&scene), 0), scene.render());
}

#[test]
fn more_threads_than_rows() {
    let mut scene = test_scene();
    scene.height = 2;
    let scene = Arc::new(scene);

    assert_eq!(render(Arc::clone(&scene), 16), scene.render());
}
