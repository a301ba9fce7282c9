use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::{
    action::{Action, Page},
    components::{
        Component,
        collection::CollectionPage,
        data_table::SortMode,
        navbar::NavBar,
        statusbar::StatusBar,
    },
    config::Config,
    reorder::PersistenceMode,
    transport::{self, Banner, CareerItem, Category},
    tui::{Event, Tui},
};

pub struct App {
    config: Config,
    tick_rate: f64,
    frame_rate: f64,
    components: Vec<Box<dyn Component>>,
    should_quit: bool,
    should_suspend: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    transport_tx: UnboundedSender<transport::Command>,
    transport_rx: UnboundedReceiver<transport::Event>,
}

impl App {
    pub fn new(
        config: Config,
        tick_rate: f64,
        frame_rate: f64,
        transport_tx: UnboundedSender<transport::Command>,
        transport_rx: UnboundedReceiver<transport::Event>,
    ) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Ok(Self {
            tick_rate,
            frame_rate,
            components: vec![
                Box::new(NavBar::default()),
                // Immediate pages move with the keyboard only; drag-drop needs an explicit save.
                Box::new(CollectionPage::<Banner>::new(
                    PersistenceMode::Immediate,
                    SortMode::External,
                    false,
                )),
                Box::new(CollectionPage::<Category>::new(
                    PersistenceMode::Immediate,
                    SortMode::Internal,
                    false,
                )),
                Box::new(CollectionPage::<CareerItem>::new(
                    PersistenceMode::Batched,
                    SortMode::Internal,
                    true,
                )),
                Box::new(StatusBar::default()),
            ],
            should_quit: false,
            should_suspend: false,
            config,
            action_tx,
            action_rx,
            transport_tx,
            transport_rx,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        let mut tui = Tui::new()?
            .mouse(self.config.table.mouse)
            .tick_rate(self.tick_rate)
            .frame_rate(self.frame_rate);
        tui.enter()?;

        for component in self.components.iter_mut() {
            component.register_action_handler(self.action_tx.clone())?;
        }
        for component in self.components.iter_mut() {
            component.register_config_handler(self.config.clone())?;
        }
        for component in self.components.iter_mut() {
            component.register_transport_handler(self.transport_tx.clone())?;
        }
        for component in self.components.iter_mut() {
            component.init(tui.size()?)?;
        }

        let action_tx = self.action_tx.clone();
        action_tx.send(Action::SetActivePage(Page::default()))?;
        loop {
            self.handle_events(&mut tui).await?;
            self.handle_transport_events()?;
            self.handle_actions(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume)?;
                action_tx.send(Action::ClearScreen)?;
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                self.transport_rx.close();
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };
        let action_tx = self.action_tx.clone();
        match event {
            Event::Tick => action_tx.send(Action::Tick)?,
            Event::Render => action_tx.send(Action::Render)?,
            Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
            Event::Key(key) => self.handle_key_event(key)?,
            _ => {}
        }
        for component in self.components.iter_mut() {
            if component.is_suspended() {
                continue;
            } else if let Some(action) = component.handle_events(Some(event.clone()))? {
                action_tx.send(action)?;
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => Action::Quit,
            KeyCode::Char('z') if ctrl => Action::Suspend,
            KeyCode::Char('q') if !ctrl => Action::Quit,
            KeyCode::Char(digit) if !ctrl => match Page::from_digit(digit) {
                Some(page) => Action::SetActivePage(page),
                None => return Ok(()),
            },
            _ => return Ok(()),
        };
        self.action_tx.send(action)?;
        Ok(())
    }

    fn handle_transport_events(&mut self) -> Result<()> {
        while let Ok(event) = self.transport_rx.try_recv() {
            debug!("Transport: {event:?}");
            for component in self.components.iter_mut() {
                if let Some(action) = component.handle_transport_event(event.clone())? {
                    self.action_tx.send(action)?;
                }
            }
        }
        Ok(())
    }

    fn handle_actions(&mut self, tui: &mut Tui) -> Result<()> {
        while let Ok(action) = self.action_rx.try_recv() {
            if action != Action::Tick && action != Action::Render {
                debug!("{action:?}");
            }
            match action {
                Action::Quit => self.should_quit = true,
                Action::Suspend => self.should_suspend = true,
                Action::Resume => self.should_suspend = false,
                Action::ClearScreen => tui.terminal.clear()?,
                Action::Resize(w, h) => self.handle_resize(tui, w, h)?,
                Action::Render => self.render(tui)?,
                _ => {}
            }
            for component in self.components.iter_mut() {
                if let Some(action) = component.update(action.clone())? {
                    self.action_tx.send(action)?
                };
            }
        }
        Ok(())
    }

    fn handle_resize(&mut self, tui: &mut Tui, w: u16, h: u16) -> Result<()> {
        tui.resize(Rect::new(0, 0, w, h))?;
        self.render(tui)?;
        Ok(())
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| {
            for component in self.components.iter_mut() {
                if component.is_suspended() {
                    continue;
                } else if let Err(err) = component.draw(frame, frame.area()) {
                    let _ = self
                        .action_tx
                        .send(Action::Error(format!("Failed to draw: {err:?}")));
                }
            }
        })?;
        Ok(())
    }
}
